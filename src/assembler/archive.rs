//! Zip archive of an assembled package

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, fs as fs_error};

/// `<package>.zip` next to the package directory
pub fn archive_path(root: &Path) -> PathBuf {
    let mut name = root.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Entry name of a path relative to the package root, `/`-separated
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Deflate every file under `root` into `archive`
///
/// Entries are stored relative to `root`. Returns the number of files
/// written.
pub fn write_zip(root: &Path, archive: &Path) -> Result<usize> {
    let file = File::create(archive).map_err(|e| fs_error::write_failed(archive, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| fs_error::read_failed(root, e))?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{}/", name), options)
                .map_err(|e| fs_error::archive_failed(archive, e))?;
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        writer
            .start_file(name, options.large_file(size >= u64::from(u32::MAX)))
            .map_err(|e| fs_error::archive_failed(archive, e))?;
        let mut source =
            File::open(entry.path()).map_err(|e| fs_error::read_failed(entry.path(), e))?;
        io::copy(&mut source, &mut writer).map_err(|e| fs_error::archive_failed(archive, e))?;
        files += 1;
    }

    writer
        .finish()
        .map_err(|e| fs_error::archive_failed(archive, e))?;
    tracing::debug!("wrote {} files to {}", files, archive.display());
    Ok(files)
}
