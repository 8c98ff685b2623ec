//! Client manifest sanitizing.
//!
//! The worker chunk is emitted from the client build, so the bundler lists it
//! in the client manifests next to the page assets. Left there, the server
//! would preload it as a page script. Entries whose `src` is the worker are
//! removed after relocation.

use crate::entry::EntryPoint;
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use swkit_util::fs::atomic_write;

/// Client manifest, relative to the build dir.
pub const CLIENT_MANIFEST: &str = "dist/client/manifest.json";

/// Server copy of the client manifest, relative to the build dir.
pub const SERVER_MANIFEST: &str = "dist/server/client.manifest.json";

/// ES module form of [`SERVER_MANIFEST`].
pub const SERVER_MANIFEST_MODULE: &str = "dist/server/client.manifest.mjs";

/// What a sanitizing pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    pub client_changed: bool,
    pub server_changed: bool,
    /// Removed manifest keys, client manifest first.
    pub removed: Vec<String>,
}

impl SanitizeReport {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.client_changed || self.server_changed
    }
}

/// Remove the worker from both client manifests under `build_dir`.
///
/// Missing manifests are skipped. When the server manifest changes, its
/// `.mjs` wrapper is regenerated from the new contents.
pub fn sanitize_manifests(
    build_dir: &Path,
    root_dir: &Path,
    entry: &EntryPoint,
) -> Result<SanitizeReport> {
    let mut report = SanitizeReport::default();

    if let Some(removed) =
        sanitize_manifest_file(&build_dir.join(CLIENT_MANIFEST), root_dir, entry)?
    {
        report.client_changed = true;
        report.removed.extend(removed);
    }

    let server_manifest = build_dir.join(SERVER_MANIFEST);
    if let Some(removed) = sanitize_manifest_file(&server_manifest, root_dir, entry)? {
        report.server_changed = true;
        report.removed.extend(removed);

        let json = std::fs::read_to_string(&server_manifest)
            .map_err(|e| Error::io(&server_manifest, e))?;
        let module_path = build_dir.join(SERVER_MANIFEST_MODULE);
        atomic_write(&module_path, format!("export default {json};").as_bytes())
            .map_err(|e| Error::io(&module_path, e))?;
    }

    tracing::debug!(
        client = report.client_changed,
        server = report.server_changed,
        removed = report.removed.len(),
        "sanitized client manifests"
    );
    Ok(report)
}

/// Remove worker entries from one manifest file.
///
/// Returns the removed keys, or `None` if the file is missing or had no
/// worker entries (in which case it is left untouched).
pub fn sanitize_manifest_file(
    path: &Path,
    root_dir: &Path,
    entry: &EntryPoint,
) -> Result<Option<Vec<String>>> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };

    let mut manifest: Map<String, Value> =
        serde_json::from_str(&source).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    let removed: Vec<String> = manifest
        .iter()
        .filter(|(_, value)| is_worker_entry(value, root_dir, entry))
        .map(|(key, _)| key.clone())
        .collect();
    if removed.is_empty() {
        return Ok(None);
    }

    manifest.retain(|key, _| !removed.contains(key));

    let json = serde_json::to_string_pretty(&manifest).map_err(|source| Error::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, json.as_bytes()).map_err(|e| Error::io(path, e))?;

    Ok(Some(removed))
}

fn is_worker_entry(value: &Value, root_dir: &Path, entry: &EntryPoint) -> bool {
    match value.get("src").and_then(Value::as_str) {
        Some(src) if !src.is_empty() => entry.is_source(root_dir, src),
        _ => false,
    }
}
