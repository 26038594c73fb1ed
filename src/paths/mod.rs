//! Candidate model directories per resource kind
//!
//! The index starts with `<root>/models/<kind>` for every built-in kind and
//! then appends the roots named by an optional `extra_model_paths.yaml`
//! overlay. Earlier roots take priority during resolution.

pub mod overlay;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{KNOWN_KINDS, ResourceKind};

pub use overlay::{OVERLAY_FILE, Overlay};

/// Models directory under the installation root
pub const MODELS_DIR: &str = "models";

/// Ordered candidate roots for each kind
#[derive(Debug, Clone)]
pub struct PathIndex {
    entries: Vec<(ResourceKind, Vec<PathBuf>)>,
    by_kind: HashMap<ResourceKind, usize>,
}

impl PathIndex {
    /// Build the index for an installation, applying its overlay if present
    ///
    /// A malformed overlay is logged and ignored.
    pub fn load(install_root: &Path) -> Self {
        Self::load_with_overlay(install_root, &install_root.join(OVERLAY_FILE))
    }

    /// Build the index applying an explicit overlay file if it exists
    pub fn load_with_overlay(install_root: &Path, overlay_file: &Path) -> Self {
        let mut index = Self::with_defaults(install_root);

        if overlay_file.is_file() {
            match Overlay::from_file(overlay_file) {
                Ok(overlay) => index.apply_overlay(&overlay, install_root),
                Err(e) => {
                    tracing::warn!("Ignoring {}: {}", overlay_file.display(), e);
                }
            }
        }

        index
    }

    /// Index with only the default `models/<kind>` roots
    pub fn with_defaults(install_root: &Path) -> Self {
        let models = install_root.join(MODELS_DIR);
        let mut index = Self {
            entries: Vec::new(),
            by_kind: HashMap::new(),
        };
        for kind in KNOWN_KINDS {
            let root = models.join(kind.dir_name());
            index.push_root(kind, root);
        }
        index
    }

    /// Append overlay roots after the existing ones
    pub fn apply_overlay(&mut self, overlay: &Overlay, install_root: &Path) {
        for profile in &overlay.profiles {
            let base = overlay::resolve_base_path(&profile.base_path, install_root);
            for (kind, sub_paths) in &profile.entries {
                for sub_path in sub_paths {
                    tracing::debug!(
                        profile = %profile.name,
                        kind = %kind,
                        "adding overlay root {}",
                        base.join(sub_path).display()
                    );
                    self.push_root(kind.clone(), base.join(sub_path));
                }
            }
        }
    }

    fn push_root(&mut self, kind: ResourceKind, root: PathBuf) {
        match self.by_kind.get(&kind) {
            Some(&idx) => {
                let roots = &mut self.entries[idx].1;
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
            None => {
                self.by_kind.insert(kind.clone(), self.entries.len());
                self.entries.push((kind, vec![root]));
            }
        }
    }

    /// Candidate roots for a kind, highest priority first
    pub fn roots(&self, kind: &ResourceKind) -> &[PathBuf] {
        self.by_kind
            .get(kind)
            .map(|&idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the index knows a kind
    pub fn contains(&self, kind: &ResourceKind) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// All kinds with their roots, in index order
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(kind, roots)| (kind, roots.as_slice()))
    }

    /// All kinds in index order
    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.entries.iter().map(|(kind, _)| kind)
    }
}
