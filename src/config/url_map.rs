//! Download URLs for large models, read from a YAML mapping
//!
//! ```yaml
//! sd_xl_base_1.0.safetensors: https://huggingface.co/.../sd_xl_base_1.0.safetensors
//! SDXL/styles/anime.safetensors: https://civitai.com/api/download/models/12345
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::RawReference;
use crate::error::{Result, fs as fs_error, input};

/// Reference to URL mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlMap {
    urls: BTreeMap<String, String>,
}

impl UrlMap {
    /// Read a URL map file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, e))?;
        Self::from_yaml(&content).map_err(|e| input::config_parse_failed(path, e))
    }

    /// Parse a URL map; keys use forward slashes after parsing
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let raw: Option<BTreeMap<String, String>> = serde_yaml::from_str(yaml)?;
        let urls = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(key, url)| (key.trim().replace('\\', "/"), url.trim().to_string()))
            .filter(|(_, url)| !url.is_empty())
            .collect();
        Ok(Self { urls })
    }

    /// URL for a reference: the full reference first, then its basename
    pub fn url_for(&self, reference: &RawReference) -> Option<&str> {
        self.urls
            .get(&reference.normalized())
            .or_else(|| self.urls.get(reference.basename()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
