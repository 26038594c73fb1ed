//! Package manifest (`config.json`) data structures

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ResourceKind;
use crate::error::{Result, fs as fs_error, input};

/// Manifest file written into every package
pub const MANIFEST_FILE: &str = "config.json";

/// Manifest names looked up when fetching, in order
pub const MANIFEST_CANDIDATES: &[&str] = &[MANIFEST_FILE, "package_config.json"];

/// Package descriptor
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Embedded packages, relative to the package root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub installation_order: Vec<String>,

    /// Models to download after unpacking
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_models: Vec<AssetEntry>,

    /// Fields this tool does not interpret, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One `external_models` entry
///
/// Entries that do not describe an asset are kept verbatim so a single bad
/// entry never invalidates the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AssetEntry {
    Asset(ExternalAsset),
    Malformed(Value),
}

impl AssetEntry {
    /// The asset, or why the entry is not one
    pub fn asset(&self) -> std::result::Result<&ExternalAsset, String> {
        match self {
            Self::Asset(asset) => Ok(asset),
            Self::Malformed(value) => Err(serde_json::from_value::<ExternalAsset>(value.clone())
                .err()
                .map_or_else(|| "not an asset description".to_string(), |e| e.to_string())),
        }
    }
}

/// A model recorded for download instead of being embedded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalAsset {
    /// File name
    pub name: String,

    /// Kind directory under `models/`
    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Original reference when it carried a subdirectory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub url: String,

    /// MD5 fingerprint of the whole file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ExternalAsset {
    /// Destination relative to the `models/` directory, as components
    ///
    /// `<type>/<dirname(path)>/<basename(path)>`, or `<type>/<name>`
    /// without a path.
    pub fn relative_components(&self) -> Vec<String> {
        let mut parts = vec![self.kind.dir_name().to_string()];
        match self.path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => parts.extend(
                path.split(['/', '\\'])
                    .filter(|part| !part.is_empty() && *part != ".")
                    .map(str::to_string),
            ),
            None => parts.push(self.name.clone()),
        }
        parts
    }
}

impl Manifest {
    /// Manifest for a freshly assembled package
    pub fn new(name: impl Into<String>, workflow_file: &str) -> Self {
        Self {
            name: name.into(),
            description: format!("Auto-generated package from {}", workflow_file),
            version: "1.0.0".to_string(),
            author: Some(env!("CARGO_PKG_NAME").to_string()),
            ..Self::default()
        }
    }

    /// Parse a manifest from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(input::manifest_not_found(path));
        }
        let content = std::fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, e))?;
        Self::from_json(&content).map_err(|e| input::manifest_parse_failed(path, e))
    }

    /// Write the manifest as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{}\n", json)).map_err(|e| fs_error::write_failed(path, e))
    }

    /// First manifest file present in a directory
    pub fn find_in(dir: &Path) -> Option<PathBuf> {
        MANIFEST_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn add_external(&mut self, asset: ExternalAsset) {
        self.external_models.push(AssetEntry::Asset(asset));
    }
}
