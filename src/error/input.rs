//! Workflow, manifest and installation errors

use std::path::Path;

use super::PackError;

/// Creates a workflow not found error
pub fn workflow_not_found(path: &Path) -> PackError {
    PackError::WorkflowNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a workflow parse error
pub fn workflow_parse_failed(path: &Path, reason: impl std::fmt::Display) -> PackError {
    PackError::WorkflowParseFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a manifest not found error
pub fn manifest_not_found(path: &Path) -> PackError {
    PackError::ManifestNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a manifest parse error
pub fn manifest_parse_failed(path: &Path, reason: impl std::fmt::Display) -> PackError {
    PackError::ManifestParseFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a configuration parse error for overlay and URL map files
pub fn config_parse_failed(path: &Path, reason: impl std::fmt::Display) -> PackError {
    PackError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates an error for an output directory that would swallow an input
pub fn output_contains_input(output: &Path, input: &Path) -> PackError {
    PackError::OutputContainsInput {
        output: output.display().to_string(),
        input: input.display().to_string(),
    }
}
