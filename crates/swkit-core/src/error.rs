use crate::bundler::PluginError;
use crate::text::EditError;
use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, as reported in `--json` output.
pub mod codes {
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const CONFIG_READ: &str = "CONFIG_READ";
    pub const CONFIG_PARSE: &str = "CONFIG_PARSE";
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const ENTRY_NOT_FOUND: &str = "ENTRY_NOT_FOUND";
    pub const UNSUPPORTED_BUILDER: &str = "UNSUPPORTED_BUILDER";
    pub const PLUGIN_FAILED: &str = "PLUGIN_FAILED";
    pub const ARTIFACTS_INCOMPLETE: &str = "ARTIFACTS_INCOMPLETE";
    pub const REWRITE_FAILED: &str = "REWRITE_FAILED";
    pub const MANIFEST_PARSE: &str = "MANIFEST_PARSE";
}

/// Core error type for swkit operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Service worker entry point does not exist: {path}")]
    EntryPointMissing { path: PathBuf },

    #[error("Service worker module supports only the Vite/Rollup build stack, not {builder}")]
    UnsupportedBuilder { builder: String },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Service worker build did not record its {missing}")]
    ArtifactsIncomplete { missing: &'static str },

    #[error("Failed to rewrite imports in {path}: {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    #[error("Failed to process manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => codes::IO_ERROR,
            Self::ConfigRead { .. } => codes::CONFIG_READ,
            Self::ConfigParse { .. } => codes::CONFIG_PARSE,
            Self::InvalidConfig(_) => codes::CONFIG_INVALID,
            Self::EntryPointMissing { .. } => codes::ENTRY_NOT_FOUND,
            Self::UnsupportedBuilder { .. } => codes::UNSUPPORTED_BUILDER,
            Self::Plugin(_) => codes::PLUGIN_FAILED,
            Self::ArtifactsIncomplete { .. } => codes::ARTIFACTS_INCOMPLETE,
            Self::Rewrite { .. } => codes::REWRITE_FAILED,
            Self::ManifestParse { .. } => codes::MANIFEST_PARSE,
        }
    }

    /// Attach the path an I/O operation was working on.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias with [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
