//! Extension package resolutions

use std::path::PathBuf;

use serde::Serialize;

/// A custom node package matched by one or more identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    /// Directory name of the package under `custom_nodes/`
    pub name: String,

    /// Absolute path of the package directory
    pub path: PathBuf,
}
