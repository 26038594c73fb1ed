//! Fetch command implementation
//!
//! Downloads the external models recorded in a package manifest into a
//! ComfyUI directory. Exits with status 1 when any model could not be
//! placed, after listing what to download by hand.

use std::path::{Path, PathBuf};

use console::Style;

use crate::cli::FetchArgs;
use crate::config::manifest::{MANIFEST_CANDIDATES, MANIFEST_FILE};
use crate::config::{Credentials, Manifest};
use crate::error::{PackError, Result, input};
use crate::fetcher::{AssetStatus, FetchSummary, Fetcher, default_transports};
use crate::paths::MODELS_DIR;
use crate::progress::DownloadProgress;

/// Run fetch command
pub fn run(args: FetchArgs) -> Result<()> {
    let comfyui_dir = match args.comfyui_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| PackError::IoError {
            message: format!("Failed to get current directory: {}", e),
        })?,
    };
    let manifest_path = locate_manifest(args.config, &comfyui_dir)?;
    let manifest = Manifest::load(&manifest_path)?;

    println!("Using ComfyUI directory: {}", comfyui_dir.display());
    println!("Using config file: {}", manifest_path.display());

    if manifest.external_models.is_empty() {
        println!("No external models to download.");
        return Ok(());
    }

    let credentials = Credentials::load(manifest_path.parent().unwrap_or(Path::new(".")));
    if !credentials.has_key() {
        tracing::debug!("no Civitai API key configured, gated downloads will be refused");
    }
    let fetcher = Fetcher::new(default_transports(), credentials)
        .with_jobs(args.jobs)
        .with_progress(DownloadProgress::new());

    let summary = fetcher.fetch_all(&manifest.external_models, &comfyui_dir.join(MODELS_DIR));
    display_summary(&summary);

    if summary.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Explicit manifest, else the first candidate in the ComfyUI directory
fn locate_manifest(explicit: Option<PathBuf>, comfyui_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    Manifest::find_in(comfyui_dir).ok_or_else(|| {
        tracing::debug!(
            "looked for {} in {}",
            MANIFEST_CANDIDATES.join(", "),
            comfyui_dir.display()
        );
        input::manifest_not_found(&comfyui_dir.join(MANIFEST_FILE))
    })
}

fn display_summary(summary: &FetchSummary) {
    let dim = Style::new().dim();

    for report in &summary.reports {
        let label = match &report.status {
            AssetStatus::Present => Style::new().dim().apply_to("present"),
            AssetStatus::Downloaded => Style::new().green().apply_to("downloaded"),
            AssetStatus::Failed(_) => Style::new().red().apply_to("failed"),
        };
        println!("  {} {}", label, report.name);
    }

    println!();
    println!(
        "{} {}/{} models in place",
        Style::new().bold().apply_to("Summary:"),
        summary.succeeded(),
        summary.total()
    );

    if summary.failed() == 0 {
        return;
    }

    println!();
    println!(
        "{}",
        Style::new()
            .bold()
            .red()
            .apply_to("The following models must be downloaded manually:")
    );
    for report in summary.failures() {
        println!("  {}", Style::new().bold().apply_to(&report.name));
        if let AssetStatus::Failed(e) = &report.status {
            println!("    {} {}", dim.apply_to("Error:"), e);
        }
        if let Some(url) = &report.url {
            println!("    {} {}", dim.apply_to("URL:"), url);
        }
        if let Some(destination) = &report.destination {
            println!("    {} {}", dim.apply_to("Save to:"), destination.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::write_file;
    use tempfile::TempDir;

    #[test]
    fn test_locate_manifest_prefers_config_json() {
        let temp = TempDir::new().unwrap();
        write_file(&temp.path().join("package_config.json"), b"{}");
        assert_eq!(
            locate_manifest(None, temp.path()).unwrap(),
            temp.path().join("package_config.json")
        );

        write_file(&temp.path().join("config.json"), b"{}");
        assert_eq!(
            locate_manifest(None, temp.path()).unwrap(),
            temp.path().join("config.json")
        );
    }

    #[test]
    fn test_locate_manifest_missing() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            locate_manifest(None, temp.path()),
            Err(PackError::ManifestNotFound { .. })
        ));
    }

    #[test]
    fn test_explicit_manifest_wins() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("elsewhere.json");
        assert_eq!(
            locate_manifest(Some(explicit.clone()), temp.path()).unwrap(),
            explicit
        );
    }
}
