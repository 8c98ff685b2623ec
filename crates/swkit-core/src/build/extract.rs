//! Production extraction plugin.
//!
//! Emits the worker as an independent chunk, then substitutes the location
//! token once the bundler has named that chunk. The file name only exists
//! after chunk naming, so the hooks fill an [`ArtifactState`] in stages and
//! [`ExtractionPlugin::artifacts`] freezes it once the bundle is written.

use crate::bundler::{
    BundleContext, ChunkInfo, ChunkRef, HookResult, InputOptions, OutputOptions, Plugin,
    PluginError, RenderedChunk,
};
use crate::descriptor::LOCATION_TOKEN;
use crate::entry::EntryPoint;
use crate::error::{Error, Result};
use crate::text::EditBuffer;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Name the worker chunk is emitted under.
pub const WORKER_CHUNK_NAME: &str = "sw";

const PLUGIN_NAME: &str = "service-worker:production";

/// Build state recorded by the hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactState {
    pub chunk_ref: Option<ChunkRef>,
    /// Hashed worker file name, relative to the output directory.
    pub file_name: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Where the bundler wrote the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifacts {
    pub output_dir: PathBuf,
    pub file_name: String,
}

impl BuildArtifacts {
    /// Path of the written worker chunk.
    #[must_use]
    pub fn chunk_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// Extracts the worker into its own chunk during a client build.
#[derive(Debug)]
pub struct ExtractionPlugin {
    entry: EntryPoint,
    state: Mutex<ArtifactState>,
}

impl ExtractionPlugin {
    #[must_use]
    pub fn new(entry: EntryPoint) -> Self {
        Self {
            entry,
            state: Mutex::new(ArtifactState::default()),
        }
    }

    /// Snapshot of the state recorded so far.
    pub fn state(&self) -> ArtifactState {
        self.lock().clone()
    }

    /// The recorded output location, once the build has completed.
    pub fn artifacts(&self) -> Result<BuildArtifacts> {
        let state = self.lock();
        let file_name = state
            .file_name
            .clone()
            .ok_or(Error::ArtifactsIncomplete {
                missing: "worker file name",
            })?;
        let output_dir = state
            .output_dir
            .clone()
            .ok_or(Error::ArtifactsIncomplete {
                missing: "output directory",
            })?;
        Ok(BuildArtifacts {
            output_dir,
            file_name,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ArtifactState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the worker file name, caching the first success.
    fn file_name(&self, bundle: &dyn BundleContext) -> HookResult<String> {
        let mut state = self.lock();
        if let Some(name) = &state.file_name {
            return Ok(name.clone());
        }

        let chunk = state.chunk_ref.ok_or_else(|| {
            PluginError::new(
                PLUGIN_NAME,
                "render_chunk",
                "service worker chunk was never emitted",
            )
        })?;
        let name = bundle.file_name(chunk)?;
        tracing::debug!(file_name = %name, "resolved service worker chunk");
        state.file_name = Some(name.clone());
        Ok(name)
    }
}

impl Plugin for ExtractionPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn build_start(&self, options: &InputOptions, bundle: &dyn BundleContext) -> HookResult<()> {
        // Provisional call before the plugin list is final
        if options.plugins.is_none() {
            return Ok(());
        }

        let id = self.entry.path().to_string_lossy();
        let chunk = bundle.emit_chunk(&id, Some(WORKER_CHUNK_NAME))?;
        tracing::debug!(entry = %self.entry, chunk = chunk.0, "emitted service worker chunk");
        // Each build starts from scratch, a rebuild renames the chunk
        *self.lock() = ArtifactState {
            chunk_ref: Some(chunk),
            ..ArtifactState::default()
        };
        Ok(())
    }

    fn render_chunk(
        &self,
        code: &str,
        chunk: &ChunkInfo,
        bundle: &dyn BundleContext,
    ) -> HookResult<Option<RenderedChunk>> {
        let file_name = self.file_name(bundle)?;

        let mut buffer = EditBuffer::new(code);
        let replaced = buffer
            .replace_first(LOCATION_TOKEN, format!("/{file_name}"))
            .map_err(|e| PluginError::new(PLUGIN_NAME, "render_chunk", e.to_string()))?;
        if !replaced {
            return Ok(None);
        }

        Ok(Some(RenderedChunk {
            code: buffer.to_string(),
            map: Some(buffer.generate_map(&chunk.file_name)),
        }))
    }

    fn generate_bundle(
        &self,
        output: &OutputOptions,
        _bundle: &dyn BundleContext,
    ) -> HookResult<()> {
        if let Some(dir) = &output.dir {
            self.lock().output_dir = Some(dir.clone());
        }
        Ok(())
    }
}
