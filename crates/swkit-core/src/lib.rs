#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod build;
pub mod bundler;
pub mod config;
pub mod descriptor;
pub mod dev;
pub mod entry;
pub mod error;
pub mod imports;
pub mod module;
pub mod text;

pub use config::ProjectConfig;
pub use entry::EntryPoint;
pub use error::{Error, Result};
pub use imports::{rewrite_imports, ImportPrefix};
pub use module::{BuildSession, ConfigEnv, FinalizeReport, ServiceWorkerModule};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
