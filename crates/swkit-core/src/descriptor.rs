//! The `#service-worker` virtual module.
//!
//! Application code imports `#service-worker` to learn where the worker is
//! served:
//!
//! ```js
//! import descriptor from '#service-worker';
//! navigator.serviceWorker.register(descriptor.url);
//! ```
//!
//! In dev the URL is the fixed bridge route. In production it is a
//! placeholder that the extraction plugin replaces with the hashed file
//! name while rendering chunks.

use crate::bundler::{HookResult, LoadResult, Plugin, PluginContext, ResolveIdResult};
use serde::Serialize;

/// Identifier application code imports.
pub const SERVICE_WORKER_ID: &str = "#service-worker";

/// Network-safe form of [`SERVICE_WORKER_ID`].
///
/// Browsers treat `#...` as a URL fragment and never send it to the dev
/// server, so the short id is resolved to this one.
pub const SERVICE_WORKER_VIRTUAL_ID: &str = "virtual:serviceWorkerConfig";

/// Placeholder for the worker URL in production chunks.
pub const LOCATION_TOKEN: &str = "__SERVICE_WORKER_LOCATION__";

/// Route the dev bridge serves the compiled worker on.
pub const DEV_ROUTE: &str = "/sw.js";

/// Type declarations for the virtual module, referenced from the host's
/// generated TypeScript config.
pub const TYPES_DECLARATION: &str = r"declare module '#service-worker' {
  export interface ServiceWorkerDescriptor {
    url: string;
  }

  const descriptor: ServiceWorkerDescriptor;
  export default descriptor;
}
";

/// What application code sees when importing `#service-worker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub url: String,
}

impl Descriptor {
    /// Descriptor for the dev server.
    #[must_use]
    pub fn dev() -> Self {
        Self {
            url: DEV_ROUTE.to_string(),
        }
    }

    /// Descriptor for production builds, resolved later in `render_chunk`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            url: LOCATION_TOKEN.to_string(),
        }
    }

    /// ES module source exporting this descriptor.
    #[must_use]
    pub fn to_module(&self) -> String {
        let json = serde_json::json!({ "url": self.url });
        format!("export default {json};")
    }
}

/// Resolves and loads the `#service-worker` virtual module.
#[derive(Debug, Clone)]
pub struct DescriptorPlugin {
    descriptor: Descriptor,
}

impl DescriptorPlugin {
    #[must_use]
    pub fn new(dev: bool) -> Self {
        let descriptor = if dev {
            Descriptor::dev()
        } else {
            Descriptor::production()
        };
        Self { descriptor }
    }
}

impl Plugin for DescriptorPlugin {
    fn name(&self) -> &str {
        "service-worker:descriptors"
    }

    fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        if specifier == SERVICE_WORKER_ID {
            return Ok(Some(ResolveIdResult::resolved(SERVICE_WORKER_VIRTUAL_ID)));
        }
        Ok(None)
    }

    fn load(&self, id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        if id != SERVICE_WORKER_VIRTUAL_ID {
            return Ok(None);
        }
        Ok(Some(LoadResult::code(self.descriptor.to_module())))
    }
}
