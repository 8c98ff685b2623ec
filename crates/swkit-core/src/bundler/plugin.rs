//! Plugin system for the host bundler.
//!
//! Provides a Rollup-compatible plugin interface with hooks at the build
//! stages the service worker pipeline needs. The bundler itself is external:
//! it drives a [`PluginContainer`] and exposes its chunk graph through
//! [`BundleContext`].
//!
//! ## Example
//!
//! ```ignore
//! use swkit_core::bundler::{HookResult, Plugin, PluginContext, TransformResult};
//!
//! struct MyPlugin;
//!
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str { "my-plugin" }
//!
//!     fn transform(&self, code: &str, id: &str, _ctx: &PluginContext) -> HookResult<Option<TransformResult>> {
//!         if id.ends_with(".txt") {
//!             return Ok(Some(TransformResult::code(format!("export default {:?};", code))));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

use crate::text::SourceMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to module-level hooks.
#[derive(Debug, Default, Clone)]
pub struct PluginContext {
    /// Working directory.
    pub cwd: PathBuf,
}

impl PluginContext {
    /// Create a new plugin context.
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd }
    }
}

/// Result of resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module ID (usually a file path).
    pub id: String,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    pub fn resolved(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Result of load hook.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Module source code.
    pub code: String,
    /// Optional source map.
    pub map: Option<SourceMap>,
}

impl LoadResult {
    /// Create a load result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// Result of transform hook.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
    /// Optional source map.
    pub map: Option<SourceMap>,
}

impl TransformResult {
    /// Create a transform result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// Result of `render_chunk`: replacement code for one output chunk.
#[derive(Debug, Clone)]
pub struct RenderedChunk {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Options the bundler passes to `build_start`.
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    /// Names of the final resolved plugin list.
    ///
    /// `None` on the provisional call some hosts make before their
    /// configuration is resolved.
    pub plugins: Option<Vec<String>>,
}

/// Options the bundler passes to `generate_bundle`.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Directory the bundle is written to.
    pub dir: Option<PathBuf>,
}

/// Opaque handle to a chunk emitted through [`BundleContext::emit_chunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRef(pub u32);

/// Chunk information passed to `render_chunk`.
#[derive(Debug, Clone)]
pub struct ChunkInfo {
    /// Chunk name.
    pub name: String,
    /// Final (hashed) output file name, relative to the output directory.
    pub file_name: String,
    /// Whether this is an entry chunk.
    pub is_entry: bool,
    /// Module IDs in this chunk.
    pub modules: Vec<String>,
}

/// The bundler's side of the build, available to build-phase hooks.
pub trait BundleContext: Send + Sync {
    /// Emit `id` as an additional, independent entry chunk.
    fn emit_chunk(&self, id: &str, name: Option<&str>) -> HookResult<ChunkRef>;

    /// Final output file name of an emitted chunk.
    ///
    /// Only valid once chunk naming has completed (from `render_chunk` on).
    fn file_name(&self, chunk: ChunkRef) -> HookResult<String>;
}

/// Plugin enforcement ordering.
///
/// Controls where a plugin runs relative to others in the pipeline.
/// Mirrors Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins.
    Pre,
    /// Default ordering (no enforcement).
    #[default]
    Normal,
    /// Runs after normal plugins.
    Post,
}

/// The main plugin trait.
///
/// All methods have default implementations that do nothing, so you only
/// need to implement the hooks you care about. Hooks take `&self`: a plugin
/// that accumulates build state keeps it behind its own lock.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Called at the start of the build.
    fn build_start(&self, _options: &InputOptions, _bundle: &dyn BundleContext) -> HookResult<()> {
        Ok(())
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or default resolver handle it.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// Load a module by ID.
    fn load(&self, _id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        Ok(None)
    }

    /// Transform module source code.
    ///
    /// Return `Some(result)` to transform the code, or `None` to pass it through.
    fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        Ok(None)
    }

    /// Transform a rendered chunk.
    ///
    /// Return `Some(chunk)` to replace the chunk output, or `None` for no change.
    fn render_chunk(
        &self,
        _code: &str,
        _chunk: &ChunkInfo,
        _bundle: &dyn BundleContext,
    ) -> HookResult<Option<RenderedChunk>> {
        Ok(None)
    }

    /// Called once the bundle is fully generated, before it is written.
    fn generate_bundle(
        &self,
        _output: &OutputOptions,
        _bundle: &dyn BundleContext,
    ) -> HookResult<()> {
        Ok(())
    }
}

/// A container for managing multiple plugins.
///
/// Plugins are sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
pub struct PluginContainer {
    plugins: Vec<Arc<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create a new plugin container.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext::new(cwd),
        }
    }

    /// Add a plugin. Plugins are kept sorted by enforce order.
    pub fn add(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
        // Stable sort keeps insertion order within a level.
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Names of the registered plugins, in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Call `build_start` on all plugins.
    pub fn build_start(
        &self,
        options: &InputOptions,
        bundle: &dyn BundleContext,
    ) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.build_start(options, bundle)?;
        }
        Ok(())
    }

    /// Try to resolve a module ID through plugins.
    /// Returns None if no plugin handled the resolution.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.resolve_id(specifier, importer, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Try to load a module through plugins.
    /// Returns None if no plugin handled the load.
    pub fn load(&self, id: &str) -> HookResult<Option<LoadResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.load(id, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Transform code through all plugins.
    ///
    /// Each plugin's output is passed to the next plugin. Returns `None` if
    /// no plugin changed the code.
    pub fn transform(&self, code: &str, id: &str) -> HookResult<Option<TransformResult>> {
        let mut current: Option<TransformResult> = None;
        for plugin in &self.plugins {
            let input = current.as_ref().map_or(code, |r| r.code.as_str());
            if let Some(result) = plugin.transform(input, id, &self.ctx)? {
                current = Some(result);
            }
        }
        Ok(current)
    }

    /// Pass a rendered chunk through all plugins.
    ///
    /// Returns `None` if no plugin changed the chunk.
    pub fn render_chunk(
        &self,
        code: &str,
        chunk: &ChunkInfo,
        bundle: &dyn BundleContext,
    ) -> HookResult<Option<RenderedChunk>> {
        let mut current: Option<RenderedChunk> = None;
        for plugin in &self.plugins {
            let input = current.as_ref().map_or(code, |r| r.code.as_str());
            if let Some(rendered) = plugin.render_chunk(input, chunk, bundle)? {
                current = Some(rendered);
            }
        }
        Ok(current)
    }

    /// Call `generate_bundle` on all plugins.
    pub fn generate_bundle(
        &self,
        output: &OutputOptions,
        bundle: &dyn BundleContext,
    ) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.generate_bundle(output, bundle)?;
        }
        Ok(())
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
