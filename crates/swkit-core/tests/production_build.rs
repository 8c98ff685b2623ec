//! End-to-end production build against an in-memory bundler.
//!
//! The bundler resolves `#service-worker` through the plugin container,
//! names every chunk `<name>.<hash>.js`, renders chunks through the plugins,
//! writes them to `dist/client/_nuxt`, then the session finalizes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use swkit_core::build::{
    ServerBuildContext, CLIENT_MANIFEST, SERVER_MANIFEST, SERVER_MANIFEST_MODULE,
};
use swkit_core::bundler::{
    BundleContext, ChunkInfo, ChunkRef, HookResult, InputOptions, OutputOptions, PluginContainer,
    PluginError,
};
use swkit_core::config::EntryPointSetting;
use swkit_core::descriptor::{LOCATION_TOKEN, SERVICE_WORKER_ID};
use swkit_core::{ConfigEnv, Error, ProjectConfig, ServiceWorkerModule};
use tempfile::tempdir;

struct Emitted {
    id: String,
    name: String,
}

#[derive(Default)]
struct FakeBundler {
    emitted: Mutex<Vec<Emitted>>,
}

impl FakeBundler {
    fn file_name_for(name: &str) -> String {
        format!("{name}.5f3a9c.js")
    }
}

impl BundleContext for FakeBundler {
    fn emit_chunk(&self, id: &str, name: Option<&str>) -> HookResult<ChunkRef> {
        let mut emitted = self.emitted.lock().unwrap();
        emitted.push(Emitted {
            id: id.to_string(),
            name: name.unwrap_or("chunk").to_string(),
        });
        Ok(ChunkRef(emitted.len() as u32 - 1))
    }

    fn file_name(&self, chunk: ChunkRef) -> HookResult<String> {
        self.emitted
            .lock()
            .unwrap()
            .get(chunk.0 as usize)
            .map(|e| Self::file_name_for(&e.name))
            .ok_or_else(|| PluginError::new("fake-bundler", "file_name", "unknown chunk"))
    }
}

struct Project {
    dir: tempfile::TempDir,
    module: ServiceWorkerModule,
}

impl Project {
    fn new(worker_source: &str) -> Self {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("sw.ts"), worker_source).unwrap();

        let mut config = ProjectConfig::default();
        config.service_worker.entry_point = EntryPointSetting::Path(PathBuf::from("sw.ts"));
        let module = ServiceWorkerModule::setup(&config, dir.path(), false)
            .unwrap()
            .unwrap();
        Self { dir, module }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn client_out(&self) -> PathBuf {
        self.module.build_dir().join("dist/client/_nuxt")
    }
}

/// Run the client build. Returns the rendered app entry chunk.
fn run_client_build(project: &Project, plugins: &PluginContainer, bundler: &FakeBundler) -> String {
    plugins.build_start(&InputOptions::default(), bundler).unwrap();
    plugins
        .build_start(
            &InputOptions {
                plugins: Some(plugins.names()),
            },
            bundler,
        )
        .unwrap();

    let resolved = plugins.resolve_id(SERVICE_WORKER_ID, Some("app.ts")).unwrap().unwrap();
    let descriptor = plugins.load(&resolved.id).unwrap().unwrap().code;
    let app_code = format!("{descriptor}\nnavigator.serviceWorker.register(d.url);\n");

    let out = project.client_out();
    fs::create_dir_all(&out).unwrap();

    let app_chunk = ChunkInfo {
        name: "entry".to_string(),
        file_name: "entry.11aa22.js".to_string(),
        is_entry: true,
        modules: vec![resolved.id.clone()],
    };
    let app = plugins
        .render_chunk(&app_code, &app_chunk, bundler)
        .unwrap()
        .map_or(app_code, |r| r.code);
    fs::write(out.join(&app_chunk.file_name), &app).unwrap();

    let worker_chunk = {
        let emitted = bundler.emitted.lock().unwrap();
        let worker = &emitted[0];
        ChunkInfo {
            name: worker.name.clone(),
            file_name: FakeBundler::file_name_for(&worker.name),
            is_entry: true,
            modules: vec![worker.id.clone()],
        }
    };
    let worker_code = "import { precache } from './workbox.0b1c2d.js';\nprecache();\n";
    let worker_rendered = plugins
        .render_chunk(worker_code, &worker_chunk, bundler)
        .unwrap()
        .map_or(worker_code.to_string(), |r| r.code);
    fs::write(out.join(&worker_chunk.file_name), worker_rendered).unwrap();

    plugins
        .generate_bundle(&OutputOptions { dir: Some(out) }, bundler)
        .unwrap();

    app
}

#[test]
fn test_full_production_build() {
    let project = Project::new("self.addEventListener('install', () => self.skipWaiting());");
    let session = project.module.build_session();

    let mut plugins = PluginContainer::new(project.root().to_path_buf());
    project.module.extend_config(&mut plugins);
    session.extend_config(&mut plugins, ConfigEnv::CLIENT);

    let build_dir = project.module.build_dir().to_path_buf();
    fs::create_dir_all(build_dir.join("dist/client")).unwrap();
    fs::create_dir_all(build_dir.join("dist/server")).unwrap();
    fs::write(
        build_dir.join(CLIENT_MANIFEST),
        r#"{"sw.ts":{"src":"sw.ts","file":"_nuxt/sw.5f3a9c.js"},"app.ts":{"src":"app.ts","file":"_nuxt/entry.11aa22.js"}}"#,
    )
    .unwrap();
    fs::write(
        build_dir.join(SERVER_MANIFEST),
        r#"{"sw.ts":{"src":"sw.ts"},"app.ts":{"src":"app.ts"}}"#,
    )
    .unwrap();

    let bundler = FakeBundler::default();
    let app = run_client_build(&project, &plugins, &bundler);

    // Only the worker was emitted, under the `sw` chunk name
    {
        let emitted = bundler.emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].name, "sw");
        assert_eq!(Path::new(&emitted[0].id), project.module.entry_point().path());
    }

    assert!(!app.contains(LOCATION_TOKEN));
    assert!(app.contains(r#""url":"/sw.5f3a9c.js""#));

    let mut server = ServerBuildContext::new(&build_dir, "/_nuxt/");
    let report = session.finalize(&mut server).unwrap();

    let relocated = build_dir.join("serviceWorker/sw.5f3a9c.js");
    assert_eq!(report.worker_path, relocated);
    assert_eq!(report.import_prefix, "/_nuxt/");
    assert_eq!(
        fs::read_to_string(&relocated).unwrap(),
        "import { precache } from './_nuxt/workbox.0b1c2d.js';\nprecache();\n"
    );
    assert!(!project.client_out().join("sw.5f3a9c.js").exists());
    assert!(project.client_out().join("entry.11aa22.js").exists());

    assert_eq!(server.public_assets.len(), 1);
    assert_eq!(server.public_assets[0].base_url, "/");
    assert_eq!(server.public_assets[0].max_age, 60);

    assert!(report.manifests.client_changed);
    assert!(report.manifests.server_changed);
    let client: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(build_dir.join(CLIENT_MANIFEST)).unwrap())
            .unwrap();
    assert!(client.get("sw.ts").is_none());
    assert!(client.get("app.ts").is_some());
    let module = fs::read_to_string(build_dir.join(SERVER_MANIFEST_MODULE)).unwrap();
    assert!(module.starts_with("export default {"));
    assert!(module.ends_with("};"));
    assert!(!module.contains("sw.ts"));
}

#[test]
fn test_server_build_leaves_token_untouched() {
    let project = Project::new("self.skipWaiting();");
    let session = project.module.build_session();

    let mut plugins = PluginContainer::new(project.root().to_path_buf());
    project.module.extend_config(&mut plugins);
    session.extend_config(&mut plugins, ConfigEnv::SERVER);

    let bundler = FakeBundler::default();
    plugins
        .build_start(&InputOptions { plugins: Some(plugins.names()) }, &bundler)
        .unwrap();

    assert!(bundler.emitted.lock().unwrap().is_empty());
    let chunk = ChunkInfo {
        name: "server".to_string(),
        file_name: "server.mjs".to_string(),
        is_entry: true,
        modules: Vec::new(),
    };
    assert!(plugins
        .render_chunk(LOCATION_TOKEN, &chunk, &bundler)
        .unwrap()
        .is_none());
}

#[test]
fn test_finalize_without_output_dir_fails() {
    let project = Project::new("self.skipWaiting();");
    let session = project.module.build_session();

    let mut plugins = PluginContainer::new(project.root().to_path_buf());
    session.extend_config(&mut plugins, ConfigEnv::CLIENT);

    let bundler = FakeBundler::default();
    plugins
        .build_start(&InputOptions { plugins: Some(Vec::new()) }, &bundler)
        .unwrap();
    let chunk = ChunkInfo {
        name: "entry".to_string(),
        file_name: "entry.js".to_string(),
        is_entry: true,
        modules: Vec::new(),
    };
    plugins.render_chunk("x", &chunk, &bundler).unwrap();

    let mut server = ServerBuildContext::new(project.module.build_dir(), "/_nuxt/");
    let err = session.finalize(&mut server).unwrap_err();
    assert!(matches!(
        err,
        Error::ArtifactsIncomplete {
            missing: "output directory"
        }
    ));
}
