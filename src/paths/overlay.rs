//! `extra_model_paths.yaml` overlay parsing
//!
//! ```yaml
//! a1111:
//!     base_path: /opt/stable-diffusion-webui/
//!     checkpoints: models/Stable-diffusion
//!     loras: |
//!         models/Lora
//!         models/LyCORIS
//! ```

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::domain::ResourceKind;
use crate::error::{PackError, Result, input};

/// Overlay file name looked up in the installation root
pub const OVERLAY_FILE: &str = "extra_model_paths.yaml";

/// Keys of a profile that never name a kind
const RESERVED_KEYS: &[&str] = &["base_path", "is_default"];

/// One named installation profile of the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayProfile {
    pub name: String,
    pub base_path: PathBuf,
    /// Kind and relative sub-paths, in document order
    pub entries: Vec<(ResourceKind, Vec<String>)>,
}

/// Parsed overlay document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    pub profiles: Vec<OverlayProfile>,
}

impl Overlay {
    /// Parse an overlay file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::error::fs::read_failed(path, e))?;
        Self::from_yaml(&content).map_err(|e| match e {
            PackError::ConfigParseFailed { reason, .. } => input::config_parse_failed(path, reason),
            other => other,
        })
    }

    /// Parse overlay YAML
    ///
    /// Profiles that are not mappings or lack a `base_path` are skipped.
    /// A document whose top level is not a mapping is an error.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(yaml)?;

        let profiles_map = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(map) => map,
            other => {
                return Err(PackError::ConfigParseFailed {
                    path: OVERLAY_FILE.to_string(),
                    reason: format!("expected a mapping of profiles, found {}", kind_of(&other)),
                });
            }
        };

        let mut profiles = Vec::new();
        for (name, profile) in profiles_map {
            let Some(name) = name.as_str().map(str::to_string) else {
                continue;
            };
            let Value::Mapping(profile) = profile else {
                tracing::debug!(profile = %name, "skipping overlay profile that is not a mapping");
                continue;
            };
            let Some(base_path) = profile.get("base_path").and_then(Value::as_str) else {
                tracing::debug!(profile = %name, "skipping overlay profile without base_path");
                continue;
            };

            let mut entries = Vec::new();
            for (key, value) in &profile {
                let Some(key) = key.as_str() else { continue };
                if RESERVED_KEYS.contains(&key) {
                    continue;
                }
                let Some(value) = value.as_str() else { continue };
                let sub_paths = split_sub_paths(value);
                if !sub_paths.is_empty() {
                    entries.push((ResourceKind::parse(key), sub_paths));
                }
            }

            profiles.push(OverlayProfile {
                name,
                base_path: PathBuf::from(base_path.trim()),
                entries,
            });
        }

        Ok(Self { profiles })
    }
}

/// Split a (possibly multi-line) sub-path value into entries
fn split_sub_paths(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a profile base path against the installation root
///
/// `~` expands to the home directory; relative paths are taken relative
/// to the installation root, where the overlay file lives.
pub fn resolve_base_path(base_path: &Path, install_root: &Path) -> PathBuf {
    if let Ok(rest) = base_path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    if base_path.is_absolute() {
        base_path.to_path_buf()
    } else {
        install_root.join(base_path)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
