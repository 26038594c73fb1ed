//! ComfyUI installation detection

use std::path::{Path, PathBuf};

use crate::error::{PackError, Result};

/// Entries that mark an installation root
pub const INDICATORS: &[&str] = &["comfy", "web", "models", "custom_nodes"];

/// Indicators a directory must contain to qualify
const MIN_INDICATORS: usize = 2;

/// Whether a directory looks like a ComfyUI installation
pub fn is_installation(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };

    let names: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_lowercase())
        .collect();

    INDICATORS
        .iter()
        .filter(|indicator| names.iter().any(|name| name == *indicator))
        .count()
        >= MIN_INDICATORS
}

/// Find an installation starting from `start`
///
/// Tries `start`, then the siblings of `start`, then `ComfyUI` under the
/// home Desktop, Documents and Downloads folders.
pub fn find_from(start: &Path) -> Option<PathBuf> {
    if is_installation(start) {
        return Some(start.to_path_buf());
    }

    if let Some(found) = start.parent().and_then(find_sibling) {
        return Some(found);
    }

    let home = dirs::home_dir()?;
    ["Desktop", "Documents", "Downloads"]
        .iter()
        .map(|folder| home.join(folder).join("ComfyUI"))
        .find(|candidate| is_installation(candidate))
}

fn find_sibling(parent: &Path) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(parent)
        .ok()?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs.into_iter().find(|dir| is_installation(dir))
}

/// Use an explicit installation root or detect one from the current
/// directory
pub fn resolve_installation(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_dir() => Ok(path),
        Some(path) => Err(PackError::InstallationNotFound {
            path: path.display().to_string(),
        }),
        None => {
            let cwd = std::env::current_dir()?;
            let found = find_from(&cwd).ok_or(PackError::InstallationNotDetected)?;
            tracing::info!("Using ComfyUI installation at {}", found.display());
            Ok(found)
        }
    }
}
