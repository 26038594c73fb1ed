//! Model file lookup over the candidate roots of a kind

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::{ModelLocation, RawReference};
use crate::paths::PathIndex;

/// Locate a reference on disk
///
/// A reference without a kind is looked up under every kind in index
/// order and takes the kind of the root it is found under.
pub fn resolve_model(index: &PathIndex, reference: &RawReference) -> Option<ModelLocation> {
    match &reference.kind {
        Some(kind) => find_in_roots(index.roots(kind), reference).map(|path| ModelLocation {
            kind: kind.clone(),
            path,
        }),
        None => index.iter().find_map(|(kind, roots)| {
            find_in_roots(roots, reference).map(|path| ModelLocation {
                kind: kind.clone(),
                path,
            })
        }),
    }
}

/// Search roots in priority order, first hit wins
///
/// Each root is tried in turn for `root/<reference>` and then, for
/// references with a subdirectory, `root/<basename>`. Only when no root
/// has either is every root walked recursively comparing file names.
pub fn find_in_roots(roots: &[PathBuf], reference: &RawReference) -> Option<PathBuf> {
    let basename = reference.basename();

    for root in roots {
        let direct = reference.join_onto(root);
        if direct.is_file() {
            return Some(direct);
        }
        if reference.has_subdirectory() {
            let flat = root.join(basename);
            if flat.is_file() {
                return Some(flat);
            }
        }
    }

    roots.iter().find_map(|root| walk_for(root, basename))
}

fn walk_for(root: &Path, basename: &str) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| names_match(&entry.file_name().to_string_lossy(), basename))
        .map(walkdir::DirEntry::into_path)
}

/// File name comparison following the platform's file system
#[cfg(any(windows, target_os = "macos"))]
fn names_match(candidate: &str, wanted: &str) -> bool {
    candidate.to_lowercase() == wanted.to_lowercase()
}

#[cfg(not(any(windows, target_os = "macos")))]
fn names_match(candidate: &str, wanted: &str) -> bool {
    candidate == wanted
}
