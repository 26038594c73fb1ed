use clap::Parser;
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Scan against an auto-detected installation:\n    comfypack scan flow.json\n\n\
                   Scan against a specific installation:\n    comfypack scan flow.json -c ~/ComfyUI\n\n\
                   Machine-readable output:\n    comfypack scan flow.json --json")]
pub struct ScanArgs {
    /// Workflow JSON file exported from ComfyUI
    pub workflow: PathBuf,

    /// ComfyUI installation root (default: auto-detect)
    #[arg(long = "comfyui-path", short = 'c', value_name = "DIR")]
    pub comfyui_path: Option<PathBuf>,

    /// Model path overlay (default: extra_model_paths.yaml in the installation)
    #[arg(long = "extra-model-paths", value_name = "FILE")]
    pub extra_model_paths: Option<PathBuf>,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}
