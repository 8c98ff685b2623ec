use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Query suffix marking a module graph entry as a worker script.
pub const WORKER_QUERY: &str = "worker_file";

/// Absolute path of the service worker source file.
///
/// Resolved once against the project root; the file must exist at that point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPoint(PathBuf);

impl EntryPoint {
    /// Resolve `path` against `root` and check that the file exists.
    pub fn resolve(root: &Path, path: &Path) -> Result<Self> {
        let resolved = swkit_util::path::resolve(root, path);
        if !resolved.is_file() {
            return Err(Error::EntryPointMissing { path: resolved });
        }
        Ok(Self(resolved))
    }

    /// The absolute source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Module graph URL under which the dev compiler sees the worker.
    #[must_use]
    pub fn dev_url(&self) -> String {
        format!("{}?{WORKER_QUERY}", self.0.display())
    }

    /// Whether a manifest `src` (relative to `root`) names this entry point.
    #[must_use]
    pub fn is_source(&self, root: &Path, src: &str) -> bool {
        swkit_util::path::resolve(root, src) == self.0
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for EntryPoint {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
