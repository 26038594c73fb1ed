use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::assembler::DEFAULT_THRESHOLD_GIB;

/// How to treat models at or above the size threshold
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LargeModelChoice {
    /// Copy them into the package
    Embed,
    /// Leave them out
    Skip,
    /// Ask for each one
    Ask,
}

/// Arguments for the pack command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Package a workflow:\n    comfypack pack flow.json\n\n\
                   Choose the output and installation:\n    comfypack pack flow.json -o portrait -c ~/ComfyUI\n\n\
                   Externalize large models from a URL map:\n    comfypack pack flow.json --urls urls.yaml --large skip\n\n\
                   Include everything regardless of size:\n    comfypack pack flow.json --large embed\n\n\
                   Produce a zip archive:\n    comfypack pack flow.json --zip")]
pub struct PackArgs {
    /// Workflow JSON file exported from ComfyUI
    pub workflow: PathBuf,

    /// Output package directory (default: <workflow name>-package)
    #[arg(long, short = 'o', value_name = "NAME")]
    pub output: Option<PathBuf>,

    /// ComfyUI installation root (default: auto-detect)
    #[arg(long = "comfyui-path", short = 'c', value_name = "DIR")]
    pub comfyui_path: Option<PathBuf>,

    /// Model path overlay (default: extra_model_paths.yaml in the installation)
    #[arg(long = "extra-model-paths", value_name = "FILE")]
    pub extra_model_paths: Option<PathBuf>,

    /// Size in GB at which a model needs a decision
    #[arg(long = "size-threshold", short = 's', value_name = "GB", default_value_t = DEFAULT_THRESHOLD_GIB)]
    pub size_threshold: f64,

    /// YAML map of model file name to download URL
    #[arg(long, value_name = "FILE")]
    pub urls: Option<PathBuf>,

    /// Large models without a mapped URL (default: ask on a terminal, else skip)
    #[arg(long, value_enum, value_name = "ACTION")]
    pub large: Option<LargeModelChoice>,

    /// Replace an existing output directory
    #[arg(long)]
    pub force: bool,

    /// Deliver the package as <output>.zip instead of a directory
    #[arg(long)]
    pub zip: bool,
}
