//! Tests for the scan command

mod common;

use common::{TestInstallation, checkpoint_workflow};
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_scan_reports_resolved_checkpoint() {
    let install = TestInstallation::new();
    install.add_model("checkpoints", "model_a.safetensors", 64);
    let workflow = install.write_workflow("flow.json", &checkpoint_workflow("model_a.safetensors"));

    install
        .cmd()
        .arg("scan")
        .arg(&workflow)
        .arg("-c")
        .arg(&install.root)
        .assert()
        .success()
        .stdout(predicate::str::contains("checkpoints"))
        .stdout(predicate::str::contains("model_a.safetensors"))
        .stdout(predicate::str::contains("Not found").not());
}

#[test]
fn test_scan_json_output() {
    let install = TestInstallation::new();
    install.add_model("loras", "style/ink.safetensors", 32);
    install.add_package("ComfyUI-Impact-Pack", &[("__init__.py", "")]);
    let workflow = install.write_workflow(
        "flow.json",
        &json!({
            "nodes": [
                {"type": "LoraLoader", "widgets_values": ["style/ink.safetensors", 1.0, 1.0]},
                {"type": "SAMLoader", "properties": {"cnr_id": "comfyui-impact-pack"}, "widgets_values": ["AUTO"]},
                {"type": "CheckpointLoaderSimple", "widgets_values": ["missing.ckpt"]}
            ]
        }),
    );

    let output = install
        .cmd()
        .args(["scan", "--json", "-c"])
        .arg(&install.root)
        .arg(&workflow)
        .output()
        .expect("run scan");
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON output");
    let models = result["models"].as_array().expect("models");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["reference"]["name"], "style/ink.safetensors");
    assert!(models[0]["location"]["path"].is_string());
    assert!(models[1]["location"].is_null());

    let packages = result["packages"].as_array().expect("packages");
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0]["name"], "ComfyUI-Impact-Pack");
}

#[test]
fn test_scan_detects_installation_from_sibling() {
    let install = TestInstallation::new();
    install.add_model("checkpoints", "model_a.safetensors", 16);
    let workflow = install.write_workflow("flow.json", &checkpoint_workflow("model_a.safetensors"));

    install
        .cmd()
        .arg("scan")
        .arg(&workflow)
        .assert()
        .success()
        .stdout(predicate::str::contains("ComfyUI"));
}

#[test]
fn test_scan_missing_workflow() {
    let install = TestInstallation::new();

    install
        .cmd()
        .args(["scan", "nope.json", "-c"])
        .arg(&install.root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Workflow file not found"));
}

#[test]
fn test_scan_malformed_workflow() {
    let install = TestInstallation::new();
    let workflow = install.write_work_file("broken.json", "{ not json");

    install
        .cmd()
        .arg("scan")
        .arg(&workflow)
        .arg("-c")
        .arg(&install.root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse workflow"));
}

#[test]
fn test_scan_missing_installation() {
    let install = TestInstallation::new();
    let workflow = install.write_workflow("flow.json", &checkpoint_workflow("a.ckpt"));

    install
        .cmd()
        .arg("scan")
        .arg(&workflow)
        .arg("-c")
        .arg(install.work.join("no-such-dir"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ComfyUI directory not found"));
}
