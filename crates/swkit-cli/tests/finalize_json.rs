//! Integration tests for `swkit finalize --json`.

use serial_test::serial;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "swkit-cli", "--bin", "swkit", "--"]);
    cmd
}

#[test]
#[serial]
fn test_finalize_relocates_and_sanitizes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("sw.ts"), "").unwrap();
    fs::write(
        root.join("swkit.config.json"),
        r#"{"serviceWorker":{"entryPoint":"sw.ts","importDepth":2}}"#,
    )
    .unwrap();

    let out_dir = root.join(".nuxt/dist/client/_nuxt");
    fs::create_dir_all(&out_dir).unwrap();
    fs::create_dir_all(root.join(".nuxt/dist/server")).unwrap();
    fs::write(
        out_dir.join("sw.d41d8c.js"),
        "import { h } from './helper';\nh();\n",
    )
    .unwrap();
    fs::write(
        root.join(".nuxt/dist/client/manifest.json"),
        r#"{"a":{"src":"sw.ts"},"b":{"src":"other.ts"}}"#,
    )
    .unwrap();

    let output = cargo_bin()
        .args(["finalize", "--json", "--out-dir", ".nuxt/dist/client/_nuxt"])
        .args(["--file", "sw.d41d8c.js", "--cwd"])
        .arg(root)
        .output()
        .expect("Failed to run finalize command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");

    assert_eq!(json["ok"], true);
    assert_eq!(json["import_prefix"], "../../");
    assert_eq!(json["manifests"]["client_changed"], true);
    assert_eq!(json["manifests"]["removed"], serde_json::json!(["a"]));
    assert_eq!(json["public_assets"][0]["base_url"], "/");
    assert_eq!(json["public_assets"][0]["max_age"], 60);

    let relocated = root.join(".nuxt/serviceWorker/sw.d41d8c.js");
    assert_eq!(
        fs::read_to_string(relocated).unwrap(),
        "import { h } from '../../helper';\nh();\n"
    );
    assert!(!out_dir.join("sw.d41d8c.js").exists());
}

#[test]
#[serial]
fn test_finalize_missing_chunk_reports_error() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("sw.ts"), "").unwrap();
    fs::write(
        root.join("swkit.config.json"),
        r#"{"serviceWorker":{"entryPoint":"sw.ts"}}"#,
    )
    .unwrap();

    let output = cargo_bin()
        .args(["finalize", "--json", "--out-dir", "dist", "--file", "sw.js", "--cwd"])
        .arg(root)
        .output()
        .expect("Failed to run finalize command");

    assert!(!output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "IO_ERROR");
}
