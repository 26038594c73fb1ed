//! Transport and integrity errors

use std::path::Path;

use super::PackError;

/// Creates a transport failure error
pub fn transport_failed(
    transport: &str,
    url: &str,
    reason: impl std::fmt::Display,
) -> PackError {
    PackError::TransportFailed {
        transport: transport.to_string(),
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a non-success HTTP status error
pub fn http_status(url: &str, status: u16) -> PackError {
    PackError::HttpStatus {
        url: url.to_string(),
        status,
    }
}

/// Creates an integrity mismatch error
pub fn integrity_mismatch(path: &Path, expected: &str, actual: &str) -> PackError {
    PackError::IntegrityMismatch {
        path: path.display().to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
