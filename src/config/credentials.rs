//! Download credentials for gated hosts

use std::path::Path;

use serde::Deserialize;

use crate::error::{PackError, Result};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "CIVITAI_API_KEY";

/// Credentials file looked up next to the manifest
pub const CREDENTIALS_FILE: &str = "civitai_config.json";

/// Hosts that refuse downloads without a bearer token
pub const GATED_HOSTS: &[&str] = &["civitai.com"];

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    api_key: Option<String>,
}

/// API key for gated hosts, if one is configured
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Read the key from the environment, else from the credentials file
    /// in `dir`
    ///
    /// An unreadable credentials file is logged and treated as absent.
    pub fn load(dir: &Path) -> Self {
        let from_env = Self::new(std::env::var(API_KEY_ENV).ok());
        if from_env.api_key.is_some() {
            return from_env;
        }

        let path = dir.join(CREDENTIALS_FILE);
        if !path.is_file() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<CredentialsFile>(&content).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(file) => Self::new(file.api_key),
            Err(e) => {
                tracing::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Bearer token to send with a request for `url`
    ///
    /// Ungated hosts get no token. A gated host without a configured key
    /// is refused.
    pub fn bearer_for(&self, url: &str) -> Result<Option<&str>> {
        let Some(host) = gated_host(url) else {
            return Ok(None);
        };
        match &self.api_key {
            Some(key) => Ok(Some(key.as_str())),
            None => Err(PackError::CredentialRequired {
                host: host.to_string(),
                url: url.to_string(),
            }),
        }
    }
}

/// Gated host serving `url`, matching subdomains too
pub fn gated_host(url: &str) -> Option<&'static str> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    GATED_HOSTS
        .iter()
        .find(|gated| host == **gated || host.ends_with(&format!(".{}", gated)))
        .copied()
}
