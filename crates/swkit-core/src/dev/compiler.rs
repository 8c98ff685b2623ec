//! The live dev compiler, as seen by the bridge.

use super::graph::ModuleGraph;
use crate::bundler::{PluginContainer, PluginError, TransformResult};
use futures::future::BoxFuture;
use std::path::PathBuf;
use thiserror::Error;

/// Error while compiling the worker for a dev request.
#[derive(Error, Debug)]
pub enum DevError {
    #[error("Dev server is not set")]
    ServerNotSet,

    #[error("Failed to read service worker entry point {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Module {url} is not in the module graph")]
    NotInGraph { url: String },

    #[error("Transform failed for {url}")]
    Transform {
        url: String,
        #[source]
        source: PluginError,
    },
}

/// Module graph and transform pipeline of a running dev server.
///
/// Implemented by the host; the methods return boxed futures so the trait
/// stays object safe behind the late-bound [`super::ServerAccessor`].
pub trait DevCompiler: Send + Sync {
    /// Make sure the module graph has an entry for `url`.
    fn ensure_entry_from_url<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), DevError>>;

    /// Run `code` through the plugin pipeline as module `url`.
    ///
    /// `None` means no plugin changed the code.
    fn transform<'a>(
        &'a self,
        code: &'a str,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Option<TransformResult>, DevError>>;
}

/// A [`DevCompiler`] backed by a [`PluginContainer`] and an in-memory graph.
///
/// Used by `swkit dev`; hosts with their own compiler implement the trait
/// directly.
pub struct PipelineCompiler {
    graph: ModuleGraph,
    plugins: PluginContainer,
}

impl PipelineCompiler {
    #[must_use]
    pub fn new(plugins: PluginContainer) -> Self {
        Self {
            graph: ModuleGraph::new(),
            plugins,
        }
    }

    /// The module graph.
    #[must_use]
    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }
}

impl DevCompiler for PipelineCompiler {
    fn ensure_entry_from_url<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), DevError>> {
        Box::pin(async move {
            let node = self.graph.ensure_entry_from_url(url);
            tracing::trace!(url, kind = ?node.kind, "module graph entry");
            Ok(())
        })
    }

    fn transform<'a>(
        &'a self,
        code: &'a str,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Option<TransformResult>, DevError>> {
        Box::pin(async move {
            if self.graph.get(url).is_none() {
                return Err(DevError::NotInGraph {
                    url: url.to_string(),
                });
            }

            let result = self
                .plugins
                .transform(code, url)
                .map_err(|source| DevError::Transform {
                    url: url.to_string(),
                    source,
                })?;

            self.graph.mark_transformed(url);
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{HookResult, Plugin, PluginContext};
    use std::sync::Arc;

    struct Uppercase;

    impl Plugin for Uppercase {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn transform(
            &self,
            code: &str,
            _id: &str,
            _ctx: &PluginContext,
        ) -> HookResult<Option<TransformResult>> {
            Ok(Some(TransformResult::code(code.to_uppercase())))
        }
    }

    #[tokio::test]
    async fn test_transform_requires_graph_entry() {
        let compiler = PipelineCompiler::new(PluginContainer::default());

        let err = compiler.transform("x", "/sw.ts?worker_file").await.unwrap_err();
        assert!(matches!(err, DevError::NotInGraph { .. }));
    }

    #[tokio::test]
    async fn test_transform_runs_plugins() {
        let mut plugins = PluginContainer::default();
        plugins.add(Arc::new(Uppercase));
        let compiler = PipelineCompiler::new(plugins);

        compiler.ensure_entry_from_url("/sw.ts?worker_file").await.unwrap();
        let result = compiler
            .transform("self.skipWaiting()", "/sw.ts?worker_file")
            .await
            .unwrap();

        assert_eq!(result.unwrap().code, "SELF.SKIPWAITING()");
        assert_eq!(compiler.graph().get("/sw.ts?worker_file").unwrap().transforms, 1);
    }

    #[tokio::test]
    async fn test_no_plugins_passes_through() {
        let compiler = PipelineCompiler::new(PluginContainer::default());
        compiler.ensure_entry_from_url("/sw.js?worker_file").await.unwrap();

        let result = compiler.transform("x", "/sw.js?worker_file").await.unwrap();
        assert!(result.is_none());
    }
}
