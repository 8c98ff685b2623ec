//! Project configuration.
//!
//! Loaded from `swkit.config.json` at the project root:
//!
//! ```json
//! {
//!   "serviceWorker": { "entryPoint": "sw.ts" },
//!   "buildDir": ".nuxt",
//!   "buildAssetsDir": "/_nuxt/",
//!   "builder": "vite"
//! }
//! ```
//!
//! A missing file yields the defaults, which leave the service worker
//! subsystem disabled.

use crate::error::{Error, Result};
use crate::imports::ImportPrefix;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "swkit.config.json";

/// Project-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Service worker options (`serviceWorker` key).
    pub service_worker: ServiceWorkerOptions,

    /// Host build directory, relative to the project root.
    pub build_dir: PathBuf,

    /// Public base directory of the client bundle at runtime.
    pub build_assets_dir: String,

    /// Host build stack.
    pub builder: Builder,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            service_worker: ServiceWorkerOptions::default(),
            build_dir: PathBuf::from(".nuxt"),
            build_assets_dir: "/_nuxt/".to_string(),
            builder: Builder::default(),
        }
    }
}

impl ProjectConfig {
    /// Load `swkit.config.json` from `root`, or the defaults if it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&path)
    }

    /// Load a specific config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&source).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Absolute build directory for a project rooted at `root`.
    #[must_use]
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        swkit_util::path::resolve(root, &self.build_dir)
    }
}

/// Options under the `serviceWorker` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceWorkerOptions {
    /// Worker source, relative to the project root, or `false`.
    pub entry_point: EntryPointSetting,

    /// Explicit prefix for rewriting the relocated worker's imports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_prefix: Option<String>,

    /// Rewrite imports as if the worker moved `n` directories up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_depth: Option<usize>,
}

impl ServiceWorkerOptions {
    /// The configured import prefix, if any.
    ///
    /// `None` means the caller should derive it from the runtime assets
    /// directory.
    pub fn import_prefix(&self) -> Result<Option<ImportPrefix>> {
        match (&self.import_prefix, self.import_depth) {
            (Some(_), Some(_)) => Err(Error::InvalidConfig(
                "serviceWorker.importPrefix and serviceWorker.importDepth are mutually exclusive"
                    .to_string(),
            )),
            (Some(prefix), None) => Ok(Some(ImportPrefix::new(prefix.clone()))),
            (None, Some(depth)) => Ok(Some(ImportPrefix::parent_levels(depth))),
            (None, None) => Ok(None),
        }
    }
}

/// `serviceWorker.entryPoint`: a path or `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPointSetting {
    Path(PathBuf),
    Flag(bool),
}

impl Default for EntryPointSetting {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl EntryPointSetting {
    /// The configured path, or `None` when the subsystem is disabled.
    pub fn path(&self) -> Result<Option<&Path>> {
        match self {
            Self::Path(path) if path.as_os_str().is_empty() => Ok(None),
            Self::Path(path) => Ok(Some(path)),
            Self::Flag(false) => Ok(None),
            Self::Flag(true) => Err(Error::InvalidConfig(
                "serviceWorker.entryPoint must be a path or false".to_string(),
            )),
        }
    }
}

/// Host build stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Builder {
    #[default]
    Vite,
    Webpack,
}

impl Builder {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vite => "vite",
            Self::Webpack => "webpack",
        }
    }
}
