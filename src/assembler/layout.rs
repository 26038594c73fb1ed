//! On-disk layout of an assembled package
//!
//! ```text
//! <package>/
//!   config.json
//!   workflows/<workflow file>
//!   custom_nodes/<package>/...
//!   models/<kind>/<subdir>/<file>
//! ```

use std::path::{Path, PathBuf};

use crate::config::credentials::CREDENTIALS_FILE;
use crate::config::manifest::MANIFEST_FILE;
use crate::domain::{RawReference, ResourceKind};
use crate::error::{PackError, Result, fs as fs_error, input};

pub const WORKFLOWS_DIR: &str = "workflows";
pub const CUSTOM_NODES_DIR: &str = "custom_nodes";
pub const MODELS_DIR: &str = "models";

/// Paths inside a package directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the package directory
    ///
    /// An existing directory is refused unless `force` is set, in which case
    /// it is replaced and only its credentials file is carried over.
    pub fn create(root: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let layout = Self::new(root);
        let root = layout.root();

        let mut preserved = None;
        if root.exists() {
            if !force {
                return Err(PackError::OutputExists {
                    path: root.display().to_string(),
                });
            }
            let credentials = root.join(CREDENTIALS_FILE);
            if credentials.is_file() {
                preserved = Some(
                    std::fs::read(&credentials).map_err(|e| fs_error::read_failed(&credentials, e))?,
                );
            }
            tracing::debug!("replacing existing package at {}", root.display());
            std::fs::remove_dir_all(root).map_err(|e| fs_error::write_failed(root, e))?;
        }

        for dir in [root.to_path_buf(), layout.workflows_dir(), layout.models_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| fs_error::write_failed(&dir, e))?;
        }

        if let Some(content) = preserved {
            let credentials = root.join(CREDENTIALS_FILE);
            std::fs::write(&credentials, content)
                .map_err(|e| fs_error::write_failed(&credentials, e))?;
        }

        Ok(layout)
    }

    /// Refuse to replace an output directory holding any of `protected`
    ///
    /// Paths are compared canonically; an output that does not exist yet
    /// holds nothing.
    pub fn guard_replacement(root: &Path, protected: &[&Path]) -> Result<()> {
        let Ok(output) = dunce::canonicalize(root) else {
            return Ok(());
        };
        for path in protected {
            let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if path.starts_with(&output) {
                return Err(input::output_contains_input(root, &path));
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.root.join(WORKFLOWS_DIR)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    pub fn custom_node_dir(&self, name: &str) -> PathBuf {
        self.root.join(CUSTOM_NODES_DIR).join(name)
    }

    /// `custom_nodes/<name>` as recorded in the installation order
    pub fn custom_node_entry(name: &str) -> String {
        format!("{}/{}", CUSTOM_NODES_DIR, name)
    }

    /// Destination of a model, keeping the reference's subdirectory
    pub fn model_destination(&self, kind: &ResourceKind, reference: &RawReference) -> Result<PathBuf> {
        if let Some(part) = reference.components().find(|part| *part == "..") {
            return Err(PackError::UnsafeDestination {
                name: reference.name.clone(),
                component: part.to_string(),
            });
        }
        Ok(reference.join_onto(&self.models_dir().join(kind.dir_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_destination_keeps_subdirectory() {
        let layout = PackageLayout::new("/out/pkg");
        let reference = RawReference::new(None, "SDXL\\styles\\anime.safetensors");
        assert_eq!(
            layout
                .model_destination(&ResourceKind::Loras, &reference)
                .unwrap(),
            PathBuf::from("/out/pkg/models/loras/SDXL/styles/anime.safetensors")
        );
    }

    #[test]
    fn test_model_destination_rejects_parent_components() {
        let layout = PackageLayout::new("/out/pkg");
        let reference = RawReference::new(None, "../../outside.ckpt");
        assert!(
            layout
                .model_destination(&ResourceKind::Checkpoints, &reference)
                .is_err()
        );
    }

    #[test]
    fn test_existing_output_refused_without_force() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("pkg");
        std::fs::create_dir_all(&root).unwrap();

        let err = PackageLayout::create(&root, false).unwrap_err();
        assert!(matches!(err, PackError::OutputExists { .. }));
    }

    #[test]
    fn test_guard_refuses_output_holding_workflow() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("pkg");
        let workflow = root.join("workflows/flow.json");
        std::fs::create_dir_all(workflow.parent().unwrap()).unwrap();
        std::fs::write(&workflow, "{}").unwrap();

        let err = PackageLayout::guard_replacement(&root, &[workflow.as_path()]).unwrap_err();
        assert!(matches!(err, PackError::OutputContainsInput { .. }));
        assert!(workflow.is_file());
    }

    #[test]
    fn test_guard_refuses_ancestor_of_installation() {
        let temp = TempDir::new().unwrap();
        let installation = temp.path().join("ComfyUI");
        std::fs::create_dir_all(installation.join("models")).unwrap();

        assert!(PackageLayout::guard_replacement(temp.path(), &[installation.as_path()]).is_err());
        assert!(PackageLayout::guard_replacement(&installation, &[installation.as_path()]).is_err());
    }

    #[test]
    fn test_guard_allows_unrelated_or_missing_output() {
        let temp = TempDir::new().unwrap();
        let workflow = temp.path().join("flow.json");
        std::fs::write(&workflow, "{}").unwrap();
        let sibling = temp.path().join("pkg");
        std::fs::create_dir_all(&sibling).unwrap();

        assert!(PackageLayout::guard_replacement(&sibling, &[workflow.as_path()]).is_ok());
        assert!(
            PackageLayout::guard_replacement(&temp.path().join("absent"), &[workflow.as_path()])
                .is_ok()
        );
    }

    #[test]
    fn test_force_preserves_credentials() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("pkg");
        std::fs::create_dir_all(root.join("models/old")).unwrap();
        std::fs::write(root.join(CREDENTIALS_FILE), r#"{"api_key": "k"}"#).unwrap();
        std::fs::write(root.join("stale.txt"), "x").unwrap();

        let layout = PackageLayout::create(&root, true).unwrap();
        assert!(!root.join("stale.txt").exists());
        assert!(!root.join("models/old").exists());
        assert!(layout.workflows_dir().is_dir());
        assert_eq!(
            std::fs::read_to_string(root.join(CREDENTIALS_FILE)).unwrap(),
            r#"{"api_key": "k"}"#
        );
    }
}
