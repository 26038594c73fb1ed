//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - scan: Scan command arguments
//! - pack: Pack command arguments
//! - fetch: Fetch command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod completions;
pub mod fetch;
pub mod pack;
pub mod scan;

pub use completions::CompletionsArgs;
pub use fetch::FetchArgs;
pub use pack::{LargeModelChoice, PackArgs};
pub use scan::ScanArgs;

/// comfypack - ComfyUI workflow packager
///
/// Bundle a workflow with the models and custom nodes it needs.
#[derive(Parser, Debug)]
#[command(
    name = "comfypack",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Package ComfyUI workflows with their models and custom nodes",
    long_about = "comfypack reads a ComfyUI workflow, finds the models and custom node packages \
                  it references in a local installation, and copies them into a self-contained \
                  package. Large models can be left out and recorded for download instead, \
                  which `comfypack fetch` restores on the target machine.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  comfypack scan flow.json                   \x1b[90m# Show what a workflow needs\x1b[0m\n   \
                  comfypack pack flow.json -c ~/ComfyUI      \x1b[90m# Build flow-package/\x1b[0m\n   \
                  comfypack pack flow.json --urls urls.yaml  \x1b[90m# Externalize mapped large models\x1b[0m\n   \
                  comfypack fetch --comfyui-dir ~/ComfyUI    \x1b[90m# Download externalized models\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the models and custom nodes a workflow references
    Scan(ScanArgs),

    /// Build a package from a workflow
    Pack(PackArgs),

    /// Download the external models listed in a package manifest
    Fetch(FetchArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
