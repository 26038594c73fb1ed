//! Progress bars for packing and downloads

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar over the models and packages of a package
pub fn pack_bar(total: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb
}

/// Shorten a label to its last `max` characters
pub fn truncate_label(label: &str, max: usize) -> String {
    let count = label.chars().count();
    if count <= max {
        return label.to_string();
    }
    let tail: String = label.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}

/// One bar per concurrent download
pub struct DownloadProgress {
    multi: MultiProgress,
}

impl DownloadProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Progress that draws nothing
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Add a bar for one download; an unknown length shows a byte counter
    pub fn start(&self, name: &str, total: Option<u64>) -> ProgressBar {
        let pb = match total {
            Some(total) => {
                let style = ProgressStyle::default_bar()
                    .template("  [{bar:40.green/yellow}] {bytes}/{total_bytes} {bytes_per_sec} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉▊▋▌▍▎▏  ");
                ProgressBar::new(total).with_style(style)
            }
            None => {
                let style = ProgressStyle::default_spinner()
                    .template("  {spinner} {bytes} {bytes_per_sec} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                ProgressBar::new_spinner().with_style(style)
            }
        };
        let pb = self.multi.add(pb);
        pb.set_message(truncate_label(name, 50));
        pb
    }

    /// Print a line above the bars
    pub fn println(&self, line: impl AsRef<str>) {
        if self.multi.println(line.as_ref()).is_err() {
            println!("{}", line.as_ref());
        }
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}
