//! `swkit dev` command implementation.
//!
//! Serves the compiled service worker on its own, for hosts that do not
//! embed the bridge in their dev server:
//!
//! ```text
//! Browser requests GET /sw.js
//!   → ensure module graph entry (<entry>?worker_file)
//!   → read entry source
//!   → transform (plugin pipeline)
//!   → serve as text/javascript
//! ```

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use miette::{miette, IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use swkit_core::bundler::PluginContainer;
use swkit_core::dev::{BridgeResponse, DevServerBridge, PipelineCompiler};
use swkit_core::{ProjectConfig, ServiceWorkerModule};

/// Dev server action.
#[derive(Debug, Clone)]
pub struct DevAction {
    /// Working directory (project root).
    pub cwd: PathBuf,
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
}

/// Run the dev server.
pub fn run(action: DevAction) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    runtime.block_on(serve(action))
}

async fn serve(action: DevAction) -> Result<()> {
    let cwd = action.cwd;
    let config = ProjectConfig::load(&cwd).into_diagnostic()?;
    let module = ServiceWorkerModule::setup(&config, &cwd, true)
        .into_diagnostic()?
        .ok_or_else(|| miette!("Service worker entry point is not set"))?;

    let mut plugins = PluginContainer::new(cwd.clone());
    module.extend_config(&mut plugins);
    module.server_created(Arc::new(PipelineCompiler::new(plugins)), true);

    let bridge = module
        .dev_bridge()
        .ok_or_else(|| miette!("dev bridge is only available in dev mode"))?;
    let route = bridge.route();
    let app = router(bridge);

    let host_ip = if action.host == "localhost" {
        "127.0.0.1".to_string()
    } else {
        action.host.clone()
    };
    let addr: SocketAddr = format!("{}:{}", host_ip, action.port)
        .parse()
        .into_diagnostic()?;

    println!();
    println!(
        "  Service worker served at http://{}:{}{}",
        action.host, action.port, route
    );
    println!("  Entry point: {}", module.entry_point());
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}

/// Router exposing the bridge at its route.
pub fn router(bridge: DevServerBridge) -> Router {
    let route = bridge.route();
    Router::new()
        .route(route, get(serve_worker))
        .with_state(Arc::new(bridge))
}

async fn serve_worker(State(bridge): State<Arc<DevServerBridge>>) -> Response {
    to_response(bridge.handle().await)
}

fn to_response(bridge_response: BridgeResponse) -> Response {
    let status =
        StatusCode::from_u16(bridge_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, bridge_response.body).into_response();
    if let Some(content_type) = bridge_response.content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use swkit_core::dev::ServerCell;
    use swkit_core::EntryPoint;

    async fn spawn(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn entry(dir: &Path) -> EntryPoint {
        std::fs::write(
            dir.join("sw.js"),
            "self.addEventListener('install', () => self.skipWaiting());",
        )
        .unwrap();
        EntryPoint::resolve(dir, Path::new("sw.js")).unwrap()
    }

    #[tokio::test]
    async fn test_serves_worker_as_javascript() {
        let dir = tempfile::tempdir().unwrap();
        let cell = ServerCell::new();
        cell.set(Arc::new(PipelineCompiler::new(PluginContainer::default())));
        let addr = spawn(router(DevServerBridge::new(cell.accessor(), entry(dir.path())))).await;

        let response = reqwest::get(format!("http://{addr}/sw.js")).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            "text/javascript"
        );
        assert_eq!(
            response.text().await.unwrap(),
            "self.addEventListener('install', () => self.skipWaiting());"
        );
    }

    #[tokio::test]
    async fn test_no_server_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let cell = ServerCell::new();
        let addr = spawn(router(DevServerBridge::new(cell.accessor(), entry(dir.path())))).await;

        let response = reqwest::get(format!("http://{addr}/sw.js")).await.unwrap();

        assert_eq!(response.status(), 500);
        assert!(response.text().await.unwrap().contains("not set"));
    }
}
