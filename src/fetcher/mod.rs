//! Materialization of externalized models
//!
//! Each asset goes through the same strictly sequential steps:
//!
//! 1. check an existing file (fingerprint, else size) and skip on match
//! 2. stream the body into a temp file in the destination directory
//! 3. atomically rename the temp file onto the destination
//! 4. compare the streamed fingerprint with the recorded one
//!
//! A destination never holds a partial file. Assets are independent and
//! run on a bounded worker pool; one asset failing never stops the others.

pub mod transport;

use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::config::{AssetEntry, Credentials, ExternalAsset};
use crate::error::{PackError, Result, fetch, fs as fs_error};
use crate::hash::{self, HashingWriter};
use crate::progress::DownloadProgress;

pub use transport::{Request, Response, Transport, default_transports};

/// Default number of concurrent downloads
pub const DEFAULT_JOBS: usize = 4;

/// What happened to one asset
#[derive(Debug)]
pub enum AssetStatus {
    /// A matching file was already in place
    Present,
    /// Downloaded and verified (or nothing to verify against)
    Downloaded,
    Failed(PackError),
}

/// Outcome for one manifest entry
#[derive(Debug)]
pub struct AssetReport {
    pub index: usize,
    pub name: String,
    pub url: Option<String>,
    pub destination: Option<PathBuf>,
    pub status: AssetStatus,
}

impl AssetReport {
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, AssetStatus::Failed(_))
    }
}

/// Aggregate result of a fetch run, in manifest order
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub reports: Vec<AssetReport>,
}

impl FetchSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssetReport> {
        self.reports.iter().filter(|r| !r.succeeded())
    }
}

/// Downloads external models into a models directory
pub struct Fetcher {
    transports: Vec<Box<dyn Transport>>,
    credentials: Credentials,
    progress: DownloadProgress,
    jobs: usize,
}

impl Fetcher {
    pub fn new(transports: Vec<Box<dyn Transport>>, credentials: Credentials) -> Self {
        Self {
            transports,
            credentials,
            progress: DownloadProgress::hidden(),
            jobs: DEFAULT_JOBS,
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_progress(mut self, progress: DownloadProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Fetch every entry into `models_dir`
    pub fn fetch_all(&self, entries: &[AssetEntry], models_dir: &Path) -> FetchSummary {
        let run = || {
            entries
                .par_iter()
                .enumerate()
                .map(|(index, entry)| self.fetch_entry(index, entry, models_dir))
                .collect::<Vec<_>>()
        };

        let reports = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!("Downloading sequentially, worker pool unavailable: {}", e);
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| self.fetch_entry(index, entry, models_dir))
                    .collect()
            }
        };

        FetchSummary { reports }
    }

    fn fetch_entry(&self, index: usize, entry: &AssetEntry, models_dir: &Path) -> AssetReport {
        let asset = match entry.asset() {
            Ok(asset) => asset,
            Err(reason) => {
                let name = match entry {
                    AssetEntry::Malformed(value) => value
                        .get("name")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("<unnamed>")
                        .to_string(),
                    AssetEntry::Asset(asset) => asset.name.clone(),
                };
                let error = PackError::InvalidAsset {
                    index: index + 1,
                    reason,
                };
                tracing::warn!("{}", error);
                return AssetReport {
                    index,
                    name,
                    url: None,
                    destination: None,
                    status: AssetStatus::Failed(error),
                };
            }
        };

        let (destination, outcome) = match destination(models_dir, asset) {
            Ok(dest) => {
                let outcome = self.fetch_asset(asset, &dest);
                (Some(dest), outcome)
            }
            Err(e) => (None, Err(e)),
        };

        let status = outcome.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            AssetStatus::Failed(e)
        });

        AssetReport {
            index,
            name: asset.name.clone(),
            url: Some(asset.url.clone()),
            destination,
            status,
        }
    }

    /// Materialize one asset at `dest`
    pub fn fetch_asset(&self, asset: &ExternalAsset, dest: &Path) -> Result<AssetStatus> {
        if dest.is_file() {
            if existing_matches(asset, dest)? {
                tracing::info!("{} already present, skipping", asset.name);
                return Ok(AssetStatus::Present);
            }
            tracing::info!("{} does not match the manifest, downloading again", asset.name);
        }

        let request = Request {
            url: &asset.url,
            bearer: self.credentials.bearer_for(&asset.url)?,
        };

        let parent = dest.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| fs_error::write_failed(parent, e))?;

        let actual = self.download(&asset.name, &request, dest)?;

        if let Some(expected) = asset.hash.as_deref().filter(|h| !h.trim().is_empty()) {
            if !hash::verify_hash(expected, &actual) {
                return Err(fetch::integrity_mismatch(dest, expected, &actual));
            }
        }

        Ok(AssetStatus::Downloaded)
    }

    /// Stream into a temp file beside `dest`, then rename it into place
    ///
    /// Returns the fingerprint of the downloaded bytes.
    fn download(&self, name: &str, request: &Request<'_>, dest: &Path) -> Result<String> {
        let parent = dest.parent().unwrap_or(Path::new("."));
        let (transport, response) = transport::open_with_fallback(&self.transports, request)?;
        tracing::debug!("downloading {} via {}", request.url, transport);

        let temp = NamedTempFile::new_in(parent).map_err(|e| fs_error::write_failed(parent, e))?;
        let mut writer = HashingWriter::new(BufWriter::new(temp));

        let pb = self.progress.start(name, response.content_length);
        let copied = std::io::copy(&mut pb.wrap_read(response.body), &mut writer);
        let received = match copied {
            Ok(received) => received,
            Err(e) => {
                pb.abandon();
                return Err(fetch::transport_failed(transport, request.url, e));
            }
        };

        if let Some(expected) = response.content_length {
            if received < expected {
                pb.abandon();
                return Err(PackError::IncompleteDownload {
                    url: request.url.to_string(),
                    expected,
                    received,
                });
            }
        }

        writer.flush().map_err(|e| fs_error::write_failed(dest, e))?;
        let (buffered, fingerprint) = writer.finish();
        let temp = buffered
            .into_inner()
            .map_err(|e| fs_error::write_failed(dest, e.error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| fs_error::write_failed(dest, e))?;
        temp.persist(dest)
            .map_err(|e| fs_error::write_failed(dest, e.error))?;

        pb.finish();
        Ok(fingerprint)
    }
}

/// Whether an existing file satisfies the manifest entry
///
/// With a fingerprint the file must match it. Without one, a recorded size
/// must match; with neither, any existing file is accepted.
fn existing_matches(asset: &ExternalAsset, path: &Path) -> Result<bool> {
    if let Some(expected) = asset.hash.as_deref().filter(|h| !h.trim().is_empty()) {
        let actual = hash::hash_file(path)?;
        return Ok(hash::verify_hash(expected, &actual));
    }

    match asset.size {
        Some(size) => {
            let len = std::fs::metadata(path)
                .map_err(|e| fs_error::read_failed(path, e))?
                .len();
            Ok(len == size)
        }
        None => Ok(true),
    }
}

/// Destination of an asset under `models_dir`
///
/// Components that would leave `models_dir` are rejected.
pub fn destination(models_dir: &Path, asset: &ExternalAsset) -> Result<PathBuf> {
    let mut dest = models_dir.to_path_buf();
    for part in asset.relative_components() {
        for component in Path::new(&part).components() {
            match component {
                Component::Normal(segment) => dest.push(segment),
                other => {
                    return Err(PackError::UnsafeDestination {
                        name: asset.name.clone(),
                        component: other.as_os_str().to_string_lossy().into_owned(),
                    });
                }
            }
        }
    }
    Ok(dest)
}
