//! Host integration entry point.
//!
//! A host build system drives the service worker subsystem through a small
//! set of lifecycle calls:
//!
//! | host event               | call                                   |
//! |--------------------------|----------------------------------------|
//! | configuration loaded     | [`ServiceWorkerModule::setup`]         |
//! | bundler config extended  | [`ServiceWorkerModule::extend_config`], [`BuildSession::extend_config`] |
//! | dev server created       | [`ServiceWorkerModule::server_created`] |
//! | type generation          | [`ServiceWorkerModule::prepare_types`] |
//! | before server bundling   | [`BuildSession::finalize`]             |

use crate::build::{
    relocate, sanitize_manifests, BuildArtifacts, ExtractionPlugin, SanitizeReport,
    ServerBuildContext,
};
use crate::bundler::{Plugin, PluginContainer};
use crate::config::{Builder, ProjectConfig};
use crate::descriptor::{DescriptorPlugin, TYPES_DECLARATION};
use crate::dev::{DevCompiler, DevServerBridge, ServerCell};
use crate::entry::EntryPoint;
use crate::error::{Error, Result};
use crate::imports::ImportPrefix;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swkit_util::fs::atomic_write;

/// Type declaration file, relative to the build dir.
pub const TYPES_FILE: &str = "types/service-worker.d.ts";

/// Which bundler environment a config extension is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigEnv {
    pub is_client: bool,
}

impl ConfigEnv {
    pub const CLIENT: Self = Self { is_client: true };
    pub const SERVER: Self = Self { is_client: false };
}

/// A declaration file the host should add to its generated type references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeReference {
    pub path: PathBuf,
}

/// The configured service worker subsystem.
#[derive(Debug)]
pub struct ServiceWorkerModule {
    root: PathBuf,
    entry: EntryPoint,
    build_dir: PathBuf,
    build_assets_dir: String,
    import_prefix: Option<ImportPrefix>,
    dev: bool,
    server: ServerCell,
}

impl ServiceWorkerModule {
    /// Set up the subsystem for a project rooted at `root`.
    ///
    /// Returns `Ok(None)` when no entry point is configured.
    pub fn setup(config: &ProjectConfig, root: &Path, dev: bool) -> Result<Option<Self>> {
        let Some(entry_point) = config.service_worker.entry_point.path()? else {
            tracing::info!("Service worker entry point is not set, no routes will be generated");
            return Ok(None);
        };

        if config.builder == Builder::Webpack {
            return Err(Error::UnsupportedBuilder {
                builder: config.builder.as_str().to_string(),
            });
        }

        let entry = EntryPoint::resolve(root, entry_point)?;
        let import_prefix = config.service_worker.import_prefix()?;
        tracing::debug!(entry = %entry, dev, "service worker enabled");

        Ok(Some(Self {
            root: root.to_path_buf(),
            entry,
            build_dir: config.build_dir(root),
            build_assets_dir: config.build_assets_dir.clone(),
            import_prefix,
            dev,
            server: ServerCell::new(),
        }))
    }

    #[must_use]
    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry
    }

    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Prefix for the relocated worker's imports.
    ///
    /// Falls back to the runtime assets directory when not configured.
    #[must_use]
    pub fn import_prefix(&self) -> ImportPrefix {
        self.import_prefix
            .clone()
            .unwrap_or_else(|| ImportPrefix::new(self.build_assets_dir.clone()))
    }

    /// Register the `#service-worker` virtual module.
    pub fn extend_config(&self, plugins: &mut PluginContainer) {
        plugins.add(Arc::new(DescriptorPlugin::new(self.dev)));
    }

    /// Record the dev server once the host has created it.
    ///
    /// Only the client-side server compiles the worker.
    pub fn server_created(&self, compiler: Arc<dyn DevCompiler>, is_client: bool) {
        if is_client {
            self.server.set(compiler);
        }
    }

    /// The `/sw.js` handler, in dev mode only.
    #[must_use]
    pub fn dev_bridge(&self) -> Option<DevServerBridge> {
        self.dev
            .then(|| DevServerBridge::new(self.server.accessor(), self.entry.clone()))
    }

    /// Write the `#service-worker` type declarations.
    pub fn prepare_types(&self) -> Result<TypeReference> {
        let path = self.build_dir.join(TYPES_FILE);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        atomic_write(&path, TYPES_DECLARATION.as_bytes()).map_err(|e| Error::io(&path, e))?;
        Ok(TypeReference { path })
    }

    /// State for one production build.
    #[must_use]
    pub fn build_session(&self) -> BuildSession {
        BuildSession {
            plugin: Arc::new(ExtractionPlugin::new(self.entry.clone())),
            root: self.root.clone(),
            entry: self.entry.clone(),
            import_prefix: self.import_prefix.clone(),
        }
    }
}

/// Outcome of [`BuildSession::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeReport {
    /// New location of the worker.
    pub worker_path: PathBuf,
    pub import_prefix: String,
    pub manifests: SanitizeReport,
}

/// One production build: owns the extraction plugin and runs the
/// post-build steps.
#[derive(Debug, Clone)]
pub struct BuildSession {
    plugin: Arc<ExtractionPlugin>,
    root: PathBuf,
    entry: EntryPoint,
    import_prefix: Option<ImportPrefix>,
}

impl BuildSession {
    /// Add the extraction plugin to client builds.
    pub fn extend_config(&self, plugins: &mut PluginContainer, env: ConfigEnv) {
        if env.is_client {
            plugins.add(Arc::clone(&self.plugin) as Arc<dyn Plugin>);
        }
    }

    /// Relocate the worker and clean the manifests.
    pub fn finalize(&self, server: &mut ServerBuildContext) -> Result<FinalizeReport> {
        let artifacts = self.plugin.artifacts()?;
        self.finalize_artifacts(&artifacts, server)
    }

    /// [`finalize`](Self::finalize) for a worker chunk located by other means.
    pub fn finalize_artifacts(
        &self,
        artifacts: &BuildArtifacts,
        server: &mut ServerBuildContext,
    ) -> Result<FinalizeReport> {
        let prefix = self
            .import_prefix
            .clone()
            .unwrap_or_else(|| ImportPrefix::new(server.build_assets_dir.clone()));

        let worker_path = relocate(artifacts, server, &prefix)?;
        let manifests = sanitize_manifests(&server.build_dir, &self.root, &self.entry)?;

        tracing::info!(worker = %worker_path.display(), "service worker relocated");
        Ok(FinalizeReport {
            worker_path,
            import_prefix: prefix.as_str().to_string(),
            manifests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntryPointSetting;
    use crate::descriptor::{SERVICE_WORKER_ID, SERVICE_WORKER_VIRTUAL_ID};
    use crate::dev::PipelineCompiler;
    use std::fs;

    fn project(entry: &str) -> (tempfile::TempDir, ProjectConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sw.ts"), "self.skipWaiting();").unwrap();
        let mut config = ProjectConfig::default();
        config.service_worker.entry_point = EntryPointSetting::Path(PathBuf::from(entry));
        (dir, config)
    }

    #[test]
    fn test_disabled_without_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let module =
            ServiceWorkerModule::setup(&ProjectConfig::default(), dir.path(), true).unwrap();
        assert!(module.is_none());
    }

    #[test]
    fn test_webpack_rejected() {
        let (dir, mut config) = project("sw.ts");
        config.builder = Builder::Webpack;

        let err = ServiceWorkerModule::setup(&config, dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBuilder { .. }));
    }

    #[test]
    fn test_missing_entry_rejected() {
        let (dir, config) = project("missing.ts");

        let err = ServiceWorkerModule::setup(&config, dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::EntryPointMissing { .. }));
    }

    #[test]
    fn test_dev_setup() {
        let (dir, config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), true)
            .unwrap()
            .unwrap();

        let mut plugins = PluginContainer::default();
        module.extend_config(&mut plugins);
        assert_eq!(
            plugins.resolve_id(SERVICE_WORKER_ID, None).unwrap().unwrap().id,
            SERVICE_WORKER_VIRTUAL_ID
        );
        assert!(plugins
            .load(SERVICE_WORKER_VIRTUAL_ID)
            .unwrap()
            .unwrap()
            .code
            .contains("/sw.js"));
        assert!(module.dev_bridge().is_some());
    }

    #[test]
    fn test_production_has_no_bridge() {
        let (dir, config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();
        assert!(module.dev_bridge().is_none());
    }

    #[tokio::test]
    async fn test_only_client_server_is_recorded() {
        let (dir, config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), true)
            .unwrap()
            .unwrap();
        let bridge = module.dev_bridge().unwrap();
        let compiler: Arc<dyn DevCompiler> =
            Arc::new(PipelineCompiler::new(PluginContainer::default()));

        module.server_created(Arc::clone(&compiler), false);
        assert_eq!(bridge.handle().await.status, 500);

        module.server_created(compiler, true);
        let response = bridge.handle().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "self.skipWaiting();");
    }

    #[test]
    fn test_extraction_plugin_client_only() {
        let (dir, config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();
        let session = module.build_session();

        let mut client = PluginContainer::default();
        module.extend_config(&mut client);
        session.extend_config(&mut client, ConfigEnv::CLIENT);

        let mut server = PluginContainer::default();
        module.extend_config(&mut server);
        session.extend_config(&mut server, ConfigEnv::SERVER);

        assert_eq!(
            client.names(),
            vec!["service-worker:descriptors", "service-worker:production"]
        );
        assert_eq!(server.names(), vec!["service-worker:descriptors"]);
    }

    #[test]
    fn test_prepare_types() {
        let (dir, config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();

        let reference = module.prepare_types().unwrap();

        assert_eq!(reference.path, dir.path().join(".nuxt/types/service-worker.d.ts"));
        let declaration = fs::read_to_string(&reference.path).unwrap();
        assert!(declaration.contains("declare module '#service-worker'"));
        assert!(declaration.contains("url: string;"));
    }

    #[test]
    fn test_import_prefix_fallback() {
        let (dir, mut config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();
        assert_eq!(module.import_prefix(), ImportPrefix::new("/_nuxt/"));

        config.service_worker.import_depth = Some(2);
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();
        assert_eq!(module.import_prefix(), ImportPrefix::new("../../"));
    }

    #[test]
    fn test_finalize_before_build_fails() {
        let (dir, config) = project("sw.ts");
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();
        let mut server = ServerBuildContext::new(module.build_dir(), "/_nuxt/");

        let err = module.build_session().finalize(&mut server).unwrap_err();
        assert!(matches!(err, Error::ArtifactsIncomplete { .. }));
    }
}
