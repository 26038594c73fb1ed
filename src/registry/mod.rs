//! Registry of installed custom node packages
//!
//! Built once per run by scanning `custom_nodes/`. Every package registers
//! its directory name; identifiers declared in its sources and the
//! `[project] name` of its `pyproject.toml` become aliases. All keys are
//! case-folded. Scanning reads text only and never fails the run.

pub mod patterns;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::common::fs::NoiseFilter;

pub use patterns::IdentifierPatterns;

/// Custom node directory under the installation root
pub const CUSTOM_NODES_DIR: &str = "custom_nodes";

/// Identifier to package directory mapping
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    by_id: BTreeMap<String, PathBuf>,
}

impl PackageRegistry {
    /// Scan the `custom_nodes/` directory of an installation
    pub fn for_installation(install_root: &Path) -> Self {
        Self::scan(&install_root.join(CUSTOM_NODES_DIR))
    }

    /// Scan a custom nodes directory
    ///
    /// A missing or unreadable directory yields an empty registry.
    pub fn scan(custom_nodes_dir: &Path) -> Self {
        let mut registry = Self::default();
        let packages = package_dirs(custom_nodes_dir);

        // Directory names first so they always win over aliases
        for dir in &packages {
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                registry.register(name, dir);
            }
        }

        let patterns = IdentifierPatterns::new();
        let filter = NoiseFilter::new();
        for dir in &packages {
            for alias in package_aliases(dir, &patterns, &filter) {
                registry.register(&alias, dir);
            }
        }

        tracing::debug!(
            "registered {} identifiers for {} packages in {}",
            registry.len(),
            packages.len(),
            custom_nodes_dir.display()
        );

        registry
    }

    /// Register an identifier unless it is already taken
    ///
    /// Returns whether the identifier was added.
    pub fn register(&mut self, id: &str, path: &Path) -> bool {
        let key = id.trim().to_lowercase();
        if key.is_empty() || self.by_id.contains_key(&key) {
            return false;
        }
        self.by_id.insert(key, path.to_path_buf());
        true
    }

    /// Exact, case-insensitive lookup
    pub fn get(&self, id: &str) -> Option<&Path> {
        self.by_id.get(&id.to_lowercase()).map(PathBuf::as_path)
    }

    /// Identifiers and their package paths in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.by_id
            .iter()
            .map(|(id, path)| (id.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Immediate package directories, sorted by name
fn package_dirs(custom_nodes_dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(custom_nodes_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot read {}: {}", custom_nodes_dir.display(), e);
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            !name.starts_with('.') && name != "__pycache__"
        })
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs
}

/// Aliases declared inside one package
fn package_aliases(dir: &Path, patterns: &IdentifierPatterns, filter: &NoiseFilter) -> Vec<String> {
    let mut aliases = Vec::new();

    if let Ok(content) = std::fs::read_to_string(dir.join("pyproject.toml")) {
        aliases.extend(patterns::pyproject_name(&content));
    }

    let sources = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && filter.is_noise(&entry.file_name().to_string_lossy()))
        })
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "py"));

    for entry in sources {
        match std::fs::read_to_string(entry.path()) {
            Ok(content) => aliases.extend(patterns.extract(&content)),
            Err(e) => tracing::debug!("skipping {}: {}", entry.path().display(), e),
        }
    }

    aliases
}
