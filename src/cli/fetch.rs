use clap::Parser;
use std::path::PathBuf;

use crate::fetcher::DEFAULT_JOBS;

/// Arguments for the fetch command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Fetch into the installation the package was unpacked into:\n    comfypack fetch\n\n\
                   Fetch from an explicit manifest:\n    comfypack fetch --config pkg/config.json --comfyui-dir ~/ComfyUI\n\n\
                   Limit concurrent downloads:\n    comfypack fetch -j 2")]
pub struct FetchArgs {
    /// Package manifest (default: config.json or package_config.json in the ComfyUI directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// ComfyUI directory to download into (default: current directory)
    #[arg(long = "comfyui-dir", value_name = "DIR", env = "COMFYUI_DIR")]
    pub comfyui_dir: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(long, short = 'j', value_name = "N", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,
}
