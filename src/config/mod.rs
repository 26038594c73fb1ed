//! Configuration file handling for comfypack
//!
//! This module contains data structures for:
//! - `config.json` - Package manifest
//! - `civitai_config.json` / `CIVITAI_API_KEY` - Download credentials
//! - URL maps - filename to download URL, for unattended packing

pub mod credentials;
pub mod manifest;
pub mod url_map;

pub use credentials::Credentials;
pub use manifest::{AssetEntry, ExternalAsset, Manifest};
pub use url_map::UrlMap;
