//! MD5 fingerprints for model integrity
//!
//! Fingerprints are lower-case hex MD5 digests, the format recorded in the
//! `hash` field of a package manifest.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::{Result, fs as fs_error};

/// Optional prefix accepted on recorded fingerprints
pub const HASH_PREFIX: &str = "md5:";

const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the MD5 fingerprint of a file
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| fs_error::read_failed(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| fs_error::read_failed(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify a fingerprint matches the expected value
///
/// Comparison ignores case, surrounding whitespace and an `md5:` prefix.
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let normalize = |h: &str| {
        let h = h.trim();
        h.strip_prefix(HASH_PREFIX).unwrap_or(h).to_ascii_lowercase()
    };

    normalize(expected) == normalize(actual)
}

/// Writer that fingerprints everything written through it
pub struct HashingWriter<W> {
    inner: W,
    hasher: Md5,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Md5::new(),
        }
    }

    /// Finish hashing, returning the inner writer and the hex fingerprint
    pub fn finish(self) -> (W, String) {
        (self.inner, hex::encode(self.hasher.finalize()))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
