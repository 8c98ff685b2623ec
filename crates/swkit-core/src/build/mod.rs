//! Production build pipeline.
//!
//! ```text
//! bundler run
//!   build_start      → emit the worker as its own chunk
//!   render_chunk     → replace the location token with the hashed file name
//!   generate_bundle  → record the client output directory
//! after the bundle is written
//!   relocate         → move the worker out of the assets dir, fix its imports
//!   sanitize         → drop the worker from the client manifests
//! ```

mod extract;
mod manifest;
mod relocate;

pub use extract::{ArtifactState, BuildArtifacts, ExtractionPlugin, WORKER_CHUNK_NAME};
pub use manifest::{
    sanitize_manifest_file, sanitize_manifests, SanitizeReport, CLIENT_MANIFEST, SERVER_MANIFEST,
    SERVER_MANIFEST_MODULE,
};
pub use relocate::{relocate, WORKER_DIR_NAME, WORKER_MAX_AGE};

use serde::Serialize;
use std::path::PathBuf;

/// Directory served as static files by the production server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicAssetDir {
    /// URL prefix the directory is mounted at.
    pub base_url: String,
    pub dir: PathBuf,
    /// Cache lifetime in seconds.
    pub max_age: u32,
}

/// The host's server build, as far as the worker pipeline touches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerBuildContext {
    /// Absolute host build directory.
    pub build_dir: PathBuf,
    /// Public base directory of the client bundle, e.g. `/_nuxt/`.
    pub build_assets_dir: String,
    /// Extra static asset directories.
    pub public_assets: Vec<PublicAssetDir>,
}

impl ServerBuildContext {
    #[must_use]
    pub fn new(build_dir: impl Into<PathBuf>, build_assets_dir: impl Into<String>) -> Self {
        Self {
            build_dir: build_dir.into(),
            build_assets_dir: build_assets_dir.into(),
            public_assets: Vec::new(),
        }
    }
}
