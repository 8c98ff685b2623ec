//! Minimal-diff text surgery with source maps.

mod edit;
mod sourcemap;

pub use edit::{EditBuffer, EditError};
pub use sourcemap::SourceMap;
