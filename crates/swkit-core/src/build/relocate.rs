//! Move the built worker out of the client assets directory.
//!
//! A worker's scope is the directory it is served from, so it cannot stay
//! under the hashed assets path. It is moved to its own directory, served at
//! the site root, and its relative imports are rewritten to still reach the
//! chunks it left behind.

use super::extract::BuildArtifacts;
use super::{PublicAssetDir, ServerBuildContext};
use crate::error::{Error, Result};
use crate::imports::{rewrite_imports, ImportPrefix};
use std::path::PathBuf;
use swkit_util::fs::{atomic_write, recreate_dir};

/// Directory under the build dir the worker is moved to.
pub const WORKER_DIR_NAME: &str = "serviceWorker";

/// Cache lifetime of the worker directory, in seconds.
pub const WORKER_MAX_AGE: u32 = 60;

/// Relocate the worker chunk and register its directory as a public asset
/// source. Returns the new path of the worker.
pub fn relocate(
    artifacts: &BuildArtifacts,
    server: &mut ServerBuildContext,
    prefix: &ImportPrefix,
) -> Result<PathBuf> {
    let target_dir = server.build_dir.join(WORKER_DIR_NAME);
    std::fs::create_dir_all(&server.build_dir).map_err(|e| Error::io(&server.build_dir, e))?;
    recreate_dir(&target_dir).map_err(|e| Error::io(&target_dir, e))?;

    let source_path = artifacts.chunk_path();
    let source = std::fs::read_to_string(&source_path).map_err(|e| Error::io(&source_path, e))?;

    let output = rewrite_imports(&source, prefix, &artifacts.file_name)
        .map_err(|source| Error::Rewrite {
            path: source_path.clone(),
            source,
        })?;

    let target_path = target_dir.join(&artifacts.file_name);
    if let Some(parent) = target_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    atomic_write(&target_path, output.code.as_bytes()).map_err(|e| Error::io(&target_path, e))?;
    std::fs::remove_file(&source_path).map_err(|e| Error::io(&source_path, e))?;

    tracing::debug!(
        from = %source_path.display(),
        to = %target_path.display(),
        prefix = prefix.as_str(),
        rewritten = output.rewritten,
        "relocated service worker"
    );

    server.public_assets.push(PublicAssetDir {
        base_url: "/".to_string(),
        dir: target_dir,
        max_age: WORKER_MAX_AGE,
    });

    Ok(target_path)
}
