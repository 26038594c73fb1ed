//! Test fixtures for building fake ComfyUI installations.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::FakeInstallation;
//!
//! #[test]
//! fn my_test() {
//!     let install = FakeInstallation::new();
//!     let model = install.add_model("checkpoints", "sd15.safetensors", 64);
//!     let package = install.add_package("ComfyUI-KJNodes", &[("__init__.py", "")]);
//! }
//! ```

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A throwaway installation with `comfy/`, `web/`, `models/` and
/// `custom_nodes/`
pub struct FakeInstallation {
    temp: TempDir,
}

impl FakeInstallation {
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        for dir in ["comfy", "web", "models", "custom_nodes"] {
            std::fs::create_dir_all(temp.path().join(dir)).expect("Failed to create layout");
        }
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write a model of `size` bytes under `models/<kind_dir>/<name>`
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn add_model(&self, kind_dir: &str, name: &str, size: usize) -> PathBuf {
        let path = self.root().join("models").join(kind_dir).join(name);
        write_file(&path, &model_bytes(size));
        path
    }

    /// Create `custom_nodes/<name>` with the given files
    ///
    /// # Panics
    ///
    /// Panics if a file cannot be written.
    pub fn add_package(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.root().join("custom_nodes").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create package directory");
        for (relative, content) in files {
            write_file(&dir.join(relative), content.as_bytes());
        }
        dir
    }

    /// Write a workflow document next to the installation
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_workflow(&self, name: &str, workflow: &Value) -> PathBuf {
        let path = self.root().join("user").join(name);
        let json = serde_json::to_string_pretty(workflow).expect("Failed to serialize workflow");
        write_file(&path, json.as_bytes());
        path
    }

    /// Write `extra_model_paths.yaml`
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_overlay(&self, yaml: &str) {
        write_file(&self.root().join(crate::paths::OVERLAY_FILE), yaml.as_bytes());
    }
}

impl Default for FakeInstallation {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic model content of a given length
#[must_use]
pub fn model_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// # Panics
///
/// Panics if the file or its parent directories cannot be written.
pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
