//! `swkit finalize` command implementation.
//!
//! Runs the post-build steps for hosts that drive their bundler outside of
//! this process: the worker chunk already sits in the client output
//! directory and only needs relocating, and the manifests cleaning.

use super::{print_json, ErrorResult, SCHEMA_VERSION};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use swkit_core::build::{BuildArtifacts, PublicAssetDir, ServerBuildContext};
use swkit_core::{Error, FinalizeReport, ProjectConfig, ServiceWorkerModule};

/// Finalize command action.
#[derive(Debug, Clone)]
pub struct FinalizeAction {
    pub cwd: PathBuf,
    /// Client output directory, relative to `cwd` unless absolute.
    pub out_dir: PathBuf,
    /// Worker chunk file name.
    pub file: String,
}

/// Finalize result for JSON output.
#[derive(Serialize)]
struct FinalizeResult {
    schema_version: u32,
    ok: bool,
    #[serde(flatten)]
    report: FinalizeReport,
    public_assets: Vec<PublicAssetDir>,
    notes: Vec<String>,
}

/// Run the finalize command.
pub fn run(action: FinalizeAction, json: bool) -> Result<()> {
    match finalize(&action) {
        Ok(result) => {
            if json {
                print_json(&result)
            } else {
                print_human(&result);
                Ok(())
            }
        }
        Err(err) => {
            if json {
                print_json(&ErrorResult::new(&err))?;
                std::process::exit(1);
            }
            Err(err).into_diagnostic()
        }
    }
}

fn finalize(action: &FinalizeAction) -> swkit_core::Result<FinalizeResult> {
    let cwd = &action.cwd;
    let config = ProjectConfig::load(cwd)?;
    let module = ServiceWorkerModule::setup(&config, cwd, false)?.ok_or_else(|| {
        Error::InvalidConfig("serviceWorker.entryPoint is not set".to_string())
    })?;

    let artifacts = BuildArtifacts {
        output_dir: swkit_util::path::resolve(cwd, &action.out_dir),
        file_name: action.file.clone(),
    };
    let mut server = ServerBuildContext::new(module.build_dir(), config.build_assets_dir.clone());
    let report = module
        .build_session()
        .finalize_artifacts(&artifacts, &mut server)?;

    let mut notes = Vec::new();
    if !report.manifests.changed() {
        notes.push("no manifest entries referenced the service worker".to_string());
    }

    Ok(FinalizeResult {
        schema_version: SCHEMA_VERSION,
        ok: true,
        report,
        public_assets: server.public_assets,
        notes,
    })
}

fn print_human(result: &FinalizeResult) {
    println!(
        "Service worker relocated to {}",
        result.report.worker_path.display()
    );
    println!("  Import prefix: {}", result.report.import_prefix);
    for key in &result.report.manifests.removed {
        println!("  Removed manifest entry: {key}");
    }
    for note in &result.notes {
        println!("note: {note}");
    }
}
