//! `/sw.js` route handler.
//!
//! The dev server does not exist yet when routes are registered, so the
//! bridge holds a [`ServerAccessor`] and asks it for the live compiler on
//! every request.

use super::compiler::{DevCompiler, DevError};
use crate::descriptor::DEV_ROUTE;
use crate::entry::EntryPoint;
use std::sync::{Arc, PoisonError, RwLock};

/// Content type of the compiled worker.
pub const JAVASCRIPT_CONTENT_TYPE: &str = "text/javascript";

/// Pull-based access to the dev compiler, `None` until the server exists.
pub type ServerAccessor = Arc<dyn Fn() -> Option<Arc<dyn DevCompiler>> + Send + Sync>;

/// Slot the host fills once its dev server is created.
#[derive(Clone, Default)]
pub struct ServerCell {
    inner: Arc<RwLock<Option<Arc<dyn DevCompiler>>>>,
}

impl ServerCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the live compiler, replacing any previous one.
    pub fn set(&self, compiler: Arc<dyn DevCompiler>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(compiler);
    }

    pub fn get(&self) -> Option<Arc<dyn DevCompiler>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Accessor reading this cell.
    #[must_use]
    pub fn accessor(&self) -> ServerAccessor {
        let cell = self.clone();
        Arc::new(move || cell.get())
    }
}

impl std::fmt::Debug for ServerCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerCell")
            .field("set", &self.get().is_some())
            .finish()
    }
}

/// Framework-neutral HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl BridgeResponse {
    fn javascript(body: String) -> Self {
        Self {
            status: 200,
            content_type: Some(JAVASCRIPT_CONTENT_TYPE),
            body,
        }
    }

    fn server_error(body: String) -> Self {
        Self {
            status: 500,
            content_type: None,
            body,
        }
    }
}

/// Serves the compiled worker during development.
#[derive(Clone)]
pub struct DevServerBridge {
    server: ServerAccessor,
    entry: EntryPoint,
}

impl DevServerBridge {
    #[must_use]
    pub fn new(server: ServerAccessor, entry: EntryPoint) -> Self {
        Self { server, entry }
    }

    /// Route this handler is mounted on.
    #[must_use]
    pub fn route(&self) -> &'static str {
        DEV_ROUTE
    }

    #[must_use]
    pub fn entry(&self) -> &EntryPoint {
        &self.entry
    }

    /// Compile and serve the worker.
    ///
    /// Never fails: errors become 500 responses carrying the cause chain.
    pub async fn handle(&self) -> BridgeResponse {
        match self.compile().await {
            Ok(code) => BridgeResponse::javascript(code),
            Err(err) => {
                let report = error_chain(&err);
                if !matches!(err, DevError::ServerNotSet) {
                    tracing::error!(
                        entry = %self.entry,
                        error = %report,
                        "failed to compile service worker"
                    );
                }
                BridgeResponse::server_error(report)
            }
        }
    }

    async fn compile(&self) -> Result<String, DevError> {
        let server = (self.server)().ok_or(DevError::ServerNotSet)?;
        let url = self.entry.dev_url();

        server.ensure_entry_from_url(&url).await?;

        let code = tokio::fs::read_to_string(self.entry.path())
            .await
            .map_err(|source| DevError::Read {
                path: self.entry.path().to_path_buf(),
                source,
            })?;

        let transformed = server.transform(&code, &url).await?;
        tracing::debug!(url = %url, transformed = transformed.is_some(), "served service worker");

        Ok(transformed.map_or(code, |result| result.code))
    }
}

impl std::fmt::Debug for DevServerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevServerBridge")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// Render an error and all its sources as `outer: inner: ...`.
#[must_use]
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut report = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        report.push_str(": ");
        report.push_str(&cause.to_string());
        source = cause.source();
    }
    report
}
