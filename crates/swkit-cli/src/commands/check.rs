//! `swkit check` command implementation.

use super::{print_json, ErrorResult, SCHEMA_VERSION};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;
use swkit_core::config::CONFIG_FILE;
use swkit_core::descriptor::{DEV_ROUTE, SERVICE_WORKER_ID};
use swkit_core::{ProjectConfig, ServiceWorkerModule};

/// Check result for JSON output.
#[derive(Serialize)]
struct CheckResult {
    schema_version: u32,
    ok: bool,
    cwd: String,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_point: Option<String>,
    build_dir: String,
    builder: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    import_prefix: Option<String>,
    virtual_module: &'static str,
    dev_route: &'static str,
    notes: Vec<String>,
}

/// Run the check command.
pub fn run(cwd: &Path, json: bool) -> Result<()> {
    match check(cwd) {
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

fn check(cwd: &Path) -> swkit_core::Result<CheckResult> {
    let config = ProjectConfig::load(cwd)?;
    let module = ServiceWorkerModule::setup(&config, cwd, false)?;

    let mut notes = Vec::new();
    if !cwd.join(CONFIG_FILE).exists() {
        notes.push(format!("{CONFIG_FILE} not found, using defaults"));
    }

    Ok(CheckResult {
        schema_version: SCHEMA_VERSION,
        ok: true,
        cwd: cwd.display().to_string(),
        enabled: module.is_some(),
        entry_point: module.as_ref().map(|m| m.entry_point().to_string()),
        build_dir: config.build_dir(cwd).display().to_string(),
        builder: config.builder.as_str(),
        import_prefix: module
            .as_ref()
            .map(|m| m.import_prefix().as_str().to_string()),
        virtual_module: SERVICE_WORKER_ID,
        dev_route: DEV_ROUTE,
        notes,
    })
}

fn print_human(result: &CheckResult) {
    match &result.entry_point {
        Some(entry) => {
            println!("Service worker: {entry}");
            println!("  Build dir:     {}", result.build_dir);
            if let Some(prefix) = &result.import_prefix {
                println!("  Import prefix: {prefix}");
            }
            println!("  Dev route:     {}", result.dev_route);
        }
        None => println!("Service worker: disabled"),
    }
    for note in &result.notes {
        println!("note: {note}");
    }
}
