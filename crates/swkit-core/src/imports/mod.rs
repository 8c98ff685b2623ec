//! Import discovery and rewriting for JavaScript modules.
//!
//! Provides a scanner for static specifier spans and a rewriter that
//! re-roots relative specifiers after a file has moved.

mod rewrite;
mod scan;

pub use rewrite::{is_relative_specifier, rewrite_imports, ImportPrefix, RewriteOutput};
pub use scan::{scan_static_imports, ImportKind, StaticImport};
