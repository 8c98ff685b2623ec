//! Relative import rewriting for relocated files.
//!
//! When a compiled file moves from `<dir>/<prefix>/file.js` to `<dir>/file.js`,
//! every relative specifier it contains must gain `<prefix>` to keep
//! resolving to the same module. Only the specifier spans change; quotes,
//! whitespace and all other bytes are preserved.

use crate::imports::scan::scan_static_imports;
use crate::text::{EditBuffer, EditError, SourceMap};
use swkit_util::path::normalize_posix;

/// Path from a file's new directory to its old one, `/`-separated.
///
/// A leading `/` is ignored: `/_nuxt/` and `_nuxt/` both mean "the old
/// directory is `_nuxt` below the new one".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPrefix(String);

impl ImportPrefix {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    /// Prefix for a file that moved `levels` directories down: `../` repeated.
    #[must_use]
    pub fn parent_levels(levels: usize) -> Self {
        Self("../".repeat(levels))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rewrite one specifier, or `None` if it is not relative.
    #[must_use]
    pub fn apply(&self, specifier: &str) -> Option<String> {
        if !is_relative_specifier(specifier) {
            return None;
        }

        let prefix = self.0.trim_start_matches('/');
        let joined = if prefix.is_empty() {
            specifier.to_string()
        } else if prefix.ends_with('/') {
            format!("{prefix}{specifier}")
        } else {
            format!("{prefix}/{specifier}")
        };

        let normalized = normalize_posix(&joined);
        if normalized == ".." || normalized.starts_with("../") {
            Some(normalized)
        } else if normalized == "." {
            Some("./".to_string())
        } else {
            Some(format!("./{normalized}"))
        }
    }
}

/// Whether a specifier is resolved relative to the importing file.
///
/// Absolute paths, bare package names and URLs are not.
#[must_use]
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Rewritten code plus its source map.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    pub code: String,
    pub map: SourceMap,
    /// Number of specifiers that were changed.
    pub rewritten: usize,
}

/// Rewrite every relative static import/export specifier in `source`.
///
/// `source_name` is recorded as the map's original file.
pub fn rewrite_imports(
    source: &str,
    prefix: &ImportPrefix,
    source_name: &str,
) -> Result<RewriteOutput, EditError> {
    let mut buffer = EditBuffer::new(source);
    let mut rewritten = 0;

    for import in scan_static_imports(source) {
        let Some(replacement) = prefix.apply(&import.specifier) else {
            continue;
        };
        if replacement != import.specifier {
            buffer.overwrite(import.start, import.end, replacement)?;
            rewritten += 1;
        }
    }

    Ok(RewriteOutput {
        code: buffer.to_string(),
        map: buffer.generate_map(source_name),
        rewritten,
    })
}
