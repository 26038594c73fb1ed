//! Common test utilities for comfypack integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A fake ComfyUI installation plus a scratch area for packages
#[allow(dead_code)]
pub struct TestInstallation {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Installation root
    pub root: PathBuf,
    /// Directory outside the installation for outputs
    pub work: PathBuf,
}

impl TestInstallation {
    /// Create an installation with the usual top-level directories
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("ComfyUI");
        let work = temp.path().join("work");
        for dir in ["comfy", "web", "models", "custom_nodes"] {
            std::fs::create_dir_all(root.join(dir)).expect("Failed to create installation");
        }
        std::fs::create_dir_all(&work).expect("Failed to create work directory");
        Self { temp, root, work }
    }

    /// Place a model of `size` bytes under `models/<kind_dir>/<name>`
    #[allow(dead_code)]
    pub fn add_model(&self, kind_dir: &str, name: &str, size: usize) -> PathBuf {
        let path = self.root.join("models").join(kind_dir).join(name);
        write_file(&path, &model_bytes(size));
        path
    }

    /// Create a custom node package with the given files
    #[allow(dead_code)]
    pub fn add_package(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.root.join("custom_nodes").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create package directory");
        for (relative, content) in files {
            write_file(&dir.join(relative), content.as_bytes());
        }
        dir
    }

    /// Write a workflow into the work directory
    #[allow(dead_code)]
    pub fn write_workflow(&self, name: &str, workflow: &serde_json::Value) -> PathBuf {
        let path = self.work.join(name);
        let json = serde_json::to_string_pretty(workflow).expect("Failed to serialize workflow");
        write_file(&path, json.as_bytes());
        path
    }

    /// Write a file relative to the work directory
    #[allow(dead_code)]
    pub fn write_work_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.work.join(relative);
        write_file(&path, content.as_bytes());
        path
    }

    /// Read a JSON file
    #[allow(dead_code)]
    pub fn read_json(path: &Path) -> serde_json::Value {
        let content = std::fs::read_to_string(path).expect("Failed to read file");
        serde_json::from_str(&content).expect("Failed to parse JSON")
    }

    /// `comfypack` running in the work directory with a clean environment
    pub fn cmd(&self) -> Command {
        let mut cmd = comfypack_cmd();
        cmd.current_dir(&self.work)
            .env_remove("CIVITAI_API_KEY")
            .env_remove("COMFYUI_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestInstallation {
    fn default() -> Self {
        Self::new()
    }
}

/// Command for the comfypack binary
#[allow(deprecated)]
pub fn comfypack_cmd() -> Command {
    Command::cargo_bin("comfypack").expect("comfypack binary")
}

#[allow(dead_code)]
/// Deterministic non-empty model content
pub fn model_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

#[allow(dead_code)]
/// Write a file, creating parent directories
pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

/// Workflow loading one checkpoint
#[allow(dead_code)]
pub fn checkpoint_workflow(name: &str) -> serde_json::Value {
    serde_json::json!({
        "nodes": [{
            "id": 1,
            "type": "CheckpointLoaderSimple",
            "widgets_values": [name]
        }]
    })
}
