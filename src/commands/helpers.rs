//! Command helper utilities

use std::path::{Path, PathBuf};

use crate::detect;
use crate::error::{Result, fs as fs_error};
use crate::paths::PathIndex;
use crate::registry::PackageRegistry;
use crate::resolver::{Resolution, Resolver};
use crate::scanner::GraphScanner;

/// A ComfyUI installation with its lookup structures built
pub struct Installation {
    pub root: PathBuf,
    pub index: PathIndex,
    pub registry: PackageRegistry,
}

impl Installation {
    /// Open an explicit or auto-detected installation
    ///
    /// An explicit overlay file must exist; the installation's own
    /// `extra_model_paths.yaml` is optional.
    pub fn open(comfyui_path: Option<PathBuf>, overlay: Option<&Path>) -> Result<Self> {
        let root = detect::resolve_installation(comfyui_path)?;

        let index = match overlay {
            Some(file) if !file.is_file() => return Err(fs_error::not_found(file)),
            Some(file) => PathIndex::load_with_overlay(&root, file),
            None => PathIndex::load(&root),
        };
        let registry = PackageRegistry::for_installation(&root);
        tracing::debug!(
            "installation {} has {} package identifiers",
            root.display(),
            registry.len()
        );

        Ok(Self {
            root,
            index,
            registry,
        })
    }

    /// Scan a workflow and resolve it against this installation
    pub fn resolve_workflow(&self, workflow: &Path) -> Result<Resolution> {
        let scan = GraphScanner::new(&self.index).scan_file(workflow)?;
        tracing::debug!(
            "{} model references and {} package identifiers in {}",
            scan.references.len(),
            scan.package_ids.len(),
            workflow.display()
        );
        Ok(Resolver::new(&self.index, &self.registry).resolve(&scan))
    }
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
