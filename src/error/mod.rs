//! Error types and handling for comfypack
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`input`]: Workflow, manifest and installation errors
//! - [`fs`]: File system errors
//! - [`fetch`]: Transport and integrity errors
//!
//! Only whole-input failures are returned out of a command. Errors about a
//! single model or package are logged and counted by the caller instead.

pub mod fetch;
pub mod fs;
pub mod input;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for comfypack operations
#[derive(Error, Diagnostic, Debug)]
pub enum PackError {
    // Input errors
    #[error("Workflow file not found: {path}")]
    #[diagnostic(code(comfypack::input::workflow_not_found))]
    WorkflowNotFound { path: String },

    #[error("Failed to parse workflow: {path}: {reason}")]
    #[diagnostic(
        code(comfypack::input::workflow_parse_failed),
        help("The workflow must be a JSON export from ComfyUI (File > Export)")
    )]
    WorkflowParseFailed { path: String, reason: String },

    #[error("Manifest not found: {path}")]
    #[diagnostic(
        code(comfypack::input::manifest_not_found),
        help("Pass --config <file> or run from the unpacked package directory")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to parse manifest: {path}: {reason}")]
    #[diagnostic(code(comfypack::input::manifest_parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("ComfyUI directory not found: {path}")]
    #[diagnostic(code(comfypack::input::installation_not_found))]
    InstallationNotFound { path: String },

    #[error("Could not auto-detect a ComfyUI directory")]
    #[diagnostic(
        code(comfypack::input::installation_not_detected),
        help("Specify the installation with --comfyui-path <dir>")
    )]
    InstallationNotDetected,

    #[error("Package directory already exists: {path}")]
    #[diagnostic(
        code(comfypack::input::output_exists),
        help("Pass --force to replace it")
    )]
    OutputExists { path: String },

    #[error("Refusing to replace {output}: it contains {input}")]
    #[diagnostic(
        code(comfypack::input::output_contains_input),
        help("Choose an output directory outside the workflow and the ComfyUI installation")
    )]
    OutputContainsInput { output: String, input: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(comfypack::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(comfypack::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(comfypack::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(comfypack::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to copy {from} to {to}: {reason}")]
    #[diagnostic(code(comfypack::fs::copy_failed))]
    CopyFailed {
        from: String,
        to: String,
        reason: String,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(comfypack::fs::io_error))]
    IoError { message: String },

    #[error("Failed to write archive {path}: {reason}")]
    #[diagnostic(code(comfypack::fs::archive_failed))]
    ArchiveFailed { path: String, reason: String },

    // Fetch errors
    #[error("{transport} transport failed for {url}: {reason}")]
    #[diagnostic(code(comfypack::fetch::transport_failed))]
    TransportFailed {
        transport: String,
        url: String,
        reason: String,
    },

    #[error("Server returned status {status} for {url}")]
    #[diagnostic(code(comfypack::fetch::http_status))]
    HttpStatus { url: String, status: u16 },

    #[error("A {host} API key is required to download {url}")]
    #[diagnostic(
        code(comfypack::fetch::credential_required),
        help(
            "Set the CIVITAI_API_KEY environment variable or create civitai_config.json with an api_key field next to the manifest"
        )
    )]
    CredentialRequired { host: String, url: String },

    #[error("Incomplete download from {url}: expected {expected} bytes, received {received}")]
    #[diagnostic(code(comfypack::fetch::incomplete))]
    IncompleteDownload {
        url: String,
        expected: u64,
        received: u64,
    },

    #[error("Hash verification failed for {path}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(comfypack::fetch::integrity_mismatch),
        help("The download may be corrupted. Re-run the fetch to download it again")
    )]
    IntegrityMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Refusing to place '{name}' outside the models directory: {component}")]
    #[diagnostic(code(comfypack::fetch::unsafe_destination))]
    UnsafeDestination { name: String, component: String },

    #[error("Invalid external model entry #{index}: {reason}")]
    #[diagnostic(code(comfypack::fetch::invalid_asset))]
    InvalidAsset { index: usize, reason: String },

    // Interactive errors
    #[error("Prompt failed: {message}")]
    #[diagnostic(code(comfypack::prompt::failed))]
    PromptFailed { message: String },
}

impl From<std::io::Error> for PackError {
    fn from(err: std::io::Error) -> Self {
        PackError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for PackError {
    fn from(err: serde_yaml::Error) -> Self {
        PackError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PackError {
    fn from(err: serde_json::Error) -> Self {
        PackError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for PackError {
    fn from(err: inquire::InquireError) -> Self {
        PackError::PromptFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, PackError>;
