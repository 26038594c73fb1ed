//! File system errors

use std::path::Path;

use super::PackError;

/// Creates a file not found error
pub fn not_found(path: &Path) -> PackError {
    PackError::FileNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a file read error from an IO failure
pub fn read_failed(path: &Path, err: impl std::fmt::Display) -> PackError {
    PackError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a file write error from an IO failure
pub fn write_failed(path: &Path, err: impl std::fmt::Display) -> PackError {
    PackError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates a copy error
pub fn copy_failed(from: &Path, to: &Path, err: impl std::fmt::Display) -> PackError {
    PackError::CopyFailed {
        from: from.display().to_string(),
        to: to.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates an archive write error
pub fn archive_failed(path: &Path, err: impl std::fmt::Display) -> PackError {
    PackError::ArchiveFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
