//! Scan command implementation
//!
//! Lists the custom node packages and models a workflow needs, as found
//! in the installation, plus everything that could not be found.

use std::collections::BTreeMap;

use console::Style;

use crate::cli::ScanArgs;
use crate::commands::helpers::Installation;
use crate::error::Result;
use crate::resolver::Resolution;

/// Run scan command
pub fn run(args: ScanArgs) -> Result<()> {
    let installation = Installation::open(args.comfyui_path, args.extra_model_paths.as_deref())?;
    let resolution = installation.resolve_workflow(&args.workflow)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!(
        "{} {}",
        Style::new().bold().apply_to("Workflow:"),
        args.workflow.display()
    );
    println!(
        "{} {}",
        Style::new().bold().apply_to("ComfyUI:"),
        installation.root.display()
    );
    println!();

    display_resolution(&resolution);
    Ok(())
}

fn display_resolution(resolution: &Resolution) {
    let heading = Style::new().bold().green();
    let missing = Style::new().bold().red();
    let dim = Style::new().dim();

    println!(
        "{}",
        heading.apply_to(format!("Custom nodes ({}):", resolution.packages.len()))
    );
    for package in &resolution.packages {
        println!("  {} {}", package.name, dim.apply_to(package.path.display()));
    }
    println!();

    let mut by_kind: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for model in resolution.resolved_models() {
        if let Some(location) = &model.location {
            by_kind
                .entry(location.kind.dir_name().to_string())
                .or_default()
                .push(format!(
                    "{} {}",
                    model.reference.name,
                    dim.apply_to(location.path.display())
                ));
        }
    }

    println!(
        "{}",
        heading.apply_to(format!("Models ({}):", resolution.resolved_count()))
    );
    for (kind, models) in &by_kind {
        println!("  {}", Style::new().bold().yellow().apply_to(kind));
        for model in models {
            println!("    {}", model);
        }
    }

    if resolution.unresolved_count() == 0 {
        return;
    }

    println!();
    println!(
        "{}",
        missing.apply_to(format!("Not found ({}):", resolution.unresolved_count()))
    );
    for model in resolution.unresolved_models() {
        let kind = model
            .reference
            .kind
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |k| k.dir_name().to_string());
        println!("  {} {}", model.reference.name, dim.apply_to(format!("({})", kind)));
    }
    for id in &resolution.unresolved_packages {
        println!("  {} {}", id, dim.apply_to("(custom node)"));
    }
}
