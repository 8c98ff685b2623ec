//! Integration tests for `swkit check --json` output.
//!
//! These tests verify:
//! - JSON output is always valid JSON
//! - Schema version and `ok` are present
//! - A missing config leaves the service worker disabled
//! - Configuration errors carry SCREAMING_SNAKE_CASE codes

use serial_test::serial;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "swkit-cli", "--bin", "swkit", "--"]);
    cmd
}

fn check(dir: &Path) -> (bool, serde_json::Value) {
    let output = cargo_bin()
        .args(["check", "--json", "--cwd"])
        .arg(dir)
        .output()
        .expect("Failed to run check command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    (output.status.success(), json)
}

#[test]
#[serial]
fn test_check_without_config_is_disabled() {
    let dir = tempdir().unwrap();

    let (success, json) = check(dir.path());

    assert!(success);
    assert_eq!(json["ok"], true);
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["enabled"], false);
    assert!(json.get("entry_point").is_none());
    assert!(json["notes"].is_array());
}

#[test]
#[serial]
fn test_check_reports_entry_point() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("sw.ts"), "self.skipWaiting();").unwrap();
    std::fs::write(
        dir.path().join("swkit.config.json"),
        r#"{"serviceWorker":{"entryPoint":"sw.ts"}}"#,
    )
    .unwrap();

    let (success, json) = check(dir.path());

    assert!(success);
    assert_eq!(json["enabled"], true);
    assert!(json["entry_point"].as_str().unwrap().ends_with("sw.ts"));
    assert_eq!(json["import_prefix"], "/_nuxt/");
    assert_eq!(json["dev_route"], "/sw.js");
    assert_eq!(json["virtual_module"], "#service-worker");
}

#[test]
#[serial]
fn test_check_missing_entry_point_fails() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("swkit.config.json"),
        r#"{"serviceWorker":{"entryPoint":"missing.ts"}}"#,
    )
    .unwrap();

    let (success, json) = check(dir.path());

    assert!(!success);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "ENTRY_NOT_FOUND");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("does not exist"));
}

#[test]
#[serial]
fn test_check_webpack_rejected() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("sw.ts"), "").unwrap();
    std::fs::write(
        dir.path().join("swkit.config.json"),
        r#"{"serviceWorker":{"entryPoint":"sw.ts"},"builder":"webpack"}"#,
    )
    .unwrap();

    let (success, json) = check(dir.path());

    assert!(!success);
    assert_eq!(json["error"]["code"], "UNSUPPORTED_BUILDER");
}

#[test]
#[serial]
fn test_check_relative_cwd_reports_absolute_entry_point() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("sw.ts"), "self.skipWaiting();").unwrap();
    std::fs::write(
        dir.path().join("swkit.config.json"),
        r#"{"serviceWorker":{"entryPoint":"sw.ts"}}"#,
    )
    .unwrap();

    // Same directory, spelled relative to the process working directory
    let here = std::env::current_dir().unwrap();
    let up = "../".repeat(here.components().count() - 1);
    let target = dir.path().canonicalize().unwrap();
    let relative = Path::new(&up).join(target.strip_prefix("/").unwrap());
    assert!(relative.is_relative());

    let (success, json) = check(&relative);

    assert!(success);
    let entry = Path::new(json["entry_point"].as_str().unwrap());
    assert!(entry.is_absolute());
    assert_eq!(entry, target.join("sw.ts"));
}
