//! Tests for top-level CLI behaviour

mod common;

use common::comfypack_cmd;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    comfypack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn test_version_command() {
    comfypack_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "comfypack {}",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("Profile:"));
}

#[test]
fn test_completions_bash() {
    comfypack_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_comfypack"));
}

#[test]
fn test_completions_zsh() {
    comfypack_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_unknown_shell() {
    comfypack_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown shell"));
}

#[test]
fn test_unknown_subcommand() {
    comfypack_cmd().arg("unpack").assert().failure();
}
