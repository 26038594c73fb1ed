//! Filtered directory copies with per-file error collection

use std::fs;
use std::path::Path;

use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{PackError, Result, fs as fs_error};

/// Directory names never copied into a package or scanned for identifiers
pub const NOISE_PATTERNS: &[&str] = &[".git", ".github", "__pycache__", ".venv", "venv", "*.egg-info"];

/// Matches directory names against [`NOISE_PATTERNS`]
pub struct NoiseFilter {
    globs: Vec<Glob<'static>>,
}

impl NoiseFilter {
    pub fn new() -> Self {
        let globs = NOISE_PATTERNS
            .iter()
            .filter_map(|pattern| Glob::new(pattern).ok())
            .collect();
        Self { globs }
    }

    /// Whether a directory name is noise
    pub fn is_noise(&self, name: &str) -> bool {
        let candidate = CandidatePath::from(name);
        self.globs
            .iter()
            .any(|glob| glob.matched(&candidate).is_some())
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a filtered copy
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Files copied
    pub files: usize,
    /// Entries that could not be copied
    pub failures: Vec<PackError>,
}

impl CopyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copy a directory tree, skipping noise directories
///
/// Fails only when the destination root cannot be created. Problems with
/// individual entries are logged and collected in the report.
pub fn copy_dir_filtered(src: &Path, dst: &Path, filter: &NoiseFilter) -> Result<CopyReport> {
    fs::create_dir_all(dst).map_err(|e| fs_error::write_failed(dst, e))?;

    let mut report = CopyReport::default();
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && filter.is_noise(&entry.file_name().to_string_lossy()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(src).to_path_buf();
                tracing::warn!("Could not copy {}: {}", path.display(), e);
                report.failures.push(fs_error::read_failed(&path, e));
                continue;
            }
        };

        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        let outcome = if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| fs_error::write_failed(&target, e))
        } else {
            fs::copy(entry.path(), &target)
                .map(|_| report.files += 1)
                .map_err(|e| fs_error::copy_failed(entry.path(), &target, e))
        };

        if let Err(e) = outcome {
            tracing::warn!("{}", e);
            report.failures.push(e);
        }
    }

    Ok(report)
}

/// Copy a single file, creating parent directories
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    ensure_parent_dir(dst)?;
    fs::copy(src, dst).map_err(|e| fs_error::copy_failed(src, dst, e))
}

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;
    }
    Ok(())
}
