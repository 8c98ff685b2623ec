//! Bundler-facing interfaces.
//!
//! The host bundler (module graph, chunking, hashing, emission) is not part
//! of this crate. It drives a [`PluginContainer`] through the build phases:
//!
//! 1. **build_start** - plugins may emit extra chunks
//! 2. **resolve_id / load / transform** - per module
//! 3. **render_chunk** - per output chunk, after file names are assigned
//! 4. **generate_bundle** - once, with the output options

mod plugin;

pub use plugin::{
    BundleContext, ChunkInfo, ChunkRef, HookResult, InputOptions, LoadResult, OutputOptions,
    Plugin, PluginContainer, PluginContext, PluginEnforce, PluginError, RenderedChunk,
    ResolveIdResult, TransformResult,
};
