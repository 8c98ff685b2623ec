//! Development-mode serving of the service worker.
//!
//! The host's dev server compiles page modules; the worker is requested
//! separately by the browser at [`crate::descriptor::DEV_ROUTE`] and compiled
//! on demand through the same pipeline, tagged as a worker entry.

mod bridge;
mod compiler;
mod graph;

pub use bridge::{
    error_chain, BridgeResponse, DevServerBridge, ServerAccessor, ServerCell,
    JAVASCRIPT_CONTENT_TYPE,
};
pub use compiler::{DevCompiler, DevError, PipelineCompiler};
pub use graph::{ModuleGraph, ModuleKind, ModuleNode};
