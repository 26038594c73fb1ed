//! Custom node package lookup

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::ResolvedPackage;
use crate::registry::PackageRegistry;

/// Packages matching an identifier
///
/// An exact key match returns that package alone. Otherwise every
/// registered identifier that contains the reference, or is contained in
/// it, contributes its package. Results are unique by resolved path.
pub fn resolve_package(registry: &PackageRegistry, id: &str) -> Vec<ResolvedPackage> {
    let id = id.trim().to_lowercase();
    if id.is_empty() {
        return Vec::new();
    }

    if let Some(path) = registry.get(&id) {
        return vec![package_at(path)];
    }

    let mut seen = HashSet::new();
    registry
        .iter()
        .filter(|(key, _)| key.contains(id.as_str()) || id.contains(key))
        .filter(|(_, path)| seen.insert(canonical(path)))
        .map(|(_, path)| package_at(path))
        .collect()
}

fn package_at(path: &Path) -> ResolvedPackage {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ResolvedPackage {
        name,
        path: path.to_path_buf(),
    }
}

/// Canonical form of a path for de-duplication
pub(crate) fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
