//! Pack command implementation
//!
//! Resolves a workflow against the installation and assembles the
//! package directory, optionally delivered as a zip archive.

use std::path::{Path, PathBuf};

use console::Style;

use crate::assembler::{
    archive, Assembler, AssemblyReport, ExternalizationPolicy, FixedPolicy, LargeModelAction,
    ModelOutcome, PackageLayout, UrlMapPolicy, threshold_bytes,
};
use crate::cli::{LargeModelChoice, PackArgs};
use crate::commands::helpers::{Installation, format_size};
use crate::commands::prompt::{self, PromptPolicy};
use crate::config::{Manifest, UrlMap};
use crate::error::{PackError, Result, fs as fs_error, input};
use crate::progress;

/// Suffix of the default output directory
const PACKAGE_SUFFIX: &str = "-package";

/// Run pack command
pub fn run(args: PackArgs) -> Result<()> {
    if !args.workflow.is_file() {
        return Err(input::workflow_not_found(&args.workflow));
    }

    let installation = Installation::open(args.comfyui_path, args.extra_model_paths.as_deref())?;
    println!(
        "{} {}",
        Style::new().bold().apply_to("Using ComfyUI installation:"),
        installation.root.display()
    );

    let resolution = installation.resolve_workflow(&args.workflow)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.workflow));
    let mut policy = build_policy(args.urls.as_deref(), args.large)?;

    let archive_path = args.zip.then(|| archive::archive_path(&output));
    if args.force {
        PackageLayout::guard_replacement(
            &output,
            &[args.workflow.as_path(), installation.root.as_path()],
        )?;
    }
    if let Some(path) = archive_path.as_ref().filter(|path| path.exists() && !args.force) {
        return Err(PackError::OutputExists {
            path: path.display().to_string(),
        });
    }

    let layout = PackageLayout::create(&output, args.force)?;
    let manifest = Manifest::new(package_name(&output), &workflow_file_name(&args.workflow));

    let report = Assembler::new(
        layout,
        threshold_bytes(args.size_threshold),
        &mut *policy,
    )
    .with_progress(progress::pack_bar(0))
    .assemble(
        &args.workflow,
        &resolution.models,
        &resolution.packages,
        manifest,
    )?;

    for id in &resolution.unresolved_packages {
        tracing::warn!("No custom node package matches '{}'", id);
    }

    display_report(&report);

    if let Some(path) = archive_path {
        let files = archive::write_zip(&report.root, &path)?;
        std::fs::remove_dir_all(&report.root).map_err(|e| fs_error::write_failed(&report.root, e))?;
        println!(
            "{} {} ({} files)",
            Style::new().bold().green().apply_to("Archive created:"),
            path.display(),
            files
        );
    }
    Ok(())
}

/// `<workflow stem>-package`
fn default_output(workflow: &Path) -> PathBuf {
    let stem = workflow
        .file_stem()
        .map_or_else(|| "workflow".into(), |s| s.to_string_lossy());
    PathBuf::from(format!("{}{}", stem, PACKAGE_SUFFIX))
}

fn package_name(output: &Path) -> String {
    output
        .file_name()
        .map_or_else(|| output.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn workflow_file_name(workflow: &Path) -> String {
    workflow
        .file_name()
        .map_or_else(|| workflow.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Policy chain for large models
///
/// A URL map answers first; models it does not cover fall through to the
/// `--large` choice, which defaults to asking on a terminal and skipping
/// otherwise.
fn build_policy(
    urls: Option<&Path>,
    large: Option<LargeModelChoice>,
) -> Result<Box<dyn ExternalizationPolicy>> {
    let interactive = prompt::is_interactive();
    let choice = large.unwrap_or(if interactive {
        LargeModelChoice::Ask
    } else {
        LargeModelChoice::Skip
    });

    let fallback: Box<dyn ExternalizationPolicy> = match choice {
        LargeModelChoice::Embed => Box::new(FixedPolicy(LargeModelAction::Embed)),
        LargeModelChoice::Skip => Box::new(FixedPolicy(LargeModelAction::Skip)),
        LargeModelChoice::Ask if interactive => Box::new(PromptPolicy),
        LargeModelChoice::Ask => {
            tracing::warn!("Not running on a terminal, large models will be skipped");
            Box::new(FixedPolicy(LargeModelAction::Skip))
        }
    };

    match urls {
        Some(file) => {
            let map = UrlMap::load(file)?;
            tracing::debug!("loaded {} download URLs from {}", map.len(), file.display());
            Ok(Box::new(UrlMapPolicy::new(map, fallback)))
        }
        None => Ok(fallback),
    }
}

fn display_report(report: &AssemblyReport) {
    let dim = Style::new().dim();

    for model in &report.models {
        match &model.outcome {
            ModelOutcome::Externalized { url, size } => println!(
                "  {} {} ({}) {}",
                Style::new().cyan().apply_to("external"),
                model.reference.name,
                format_size(*size),
                dim.apply_to(url)
            ),
            ModelOutcome::Skipped { size } => println!(
                "  {} {} ({})",
                Style::new().yellow().apply_to("skipped"),
                model.reference.name,
                format_size(*size)
            ),
            ModelOutcome::Unresolved => println!(
                "  {} {}",
                Style::new().red().apply_to("missing"),
                model.reference.name
            ),
            ModelOutcome::Failed(e) => println!(
                "  {} {}: {}",
                Style::new().red().apply_to("failed"),
                model.reference.name,
                e
            ),
            ModelOutcome::Copied { .. } => {}
        }
    }

    println!();
    println!(
        "{} {}",
        Style::new().bold().green().apply_to("Package created:"),
        report.root.display()
    );
    println!(
        "  {} custom node packages, {} models copied, {} external, {} skipped, {} not found",
        report.packages.len(),
        report.copied(),
        report.externalized(),
        report.skipped(),
        report.unresolved()
    );
    if report.failed() > 0 {
        println!(
            "  {}",
            Style::new()
                .bold()
                .red()
                .apply_to(format!("{} items failed to copy", report.failed()))
        );
    }
    if report.externalized() > 0 {
        println!(
            "  {}",
            dim.apply_to("Run `comfypack fetch` in the target installation to download external models")
        );
    }
}
