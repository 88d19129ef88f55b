//! ZIP archive output.

use super::ZipArchiver;
use crate::error::ExportError;
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Writes Deflate-compressed archives with one flat entry per input file.
///
/// Entries are named by the input's file name; inputs that no longer exist
/// are skipped with a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeflateZipArchiver;

impl DeflateZipArchiver {
    /// Creates the archiver.
    pub fn new() -> Self {
        Self
    }
}

fn write_archive(zip_path: &Path, files: &[PathBuf]) -> Result<usize, String> {
    if let Some(parent) = zip_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        debug!(dir = %parent.display(), "Created directory for ZIP file");
    }

    let file = File::create(zip_path).map_err(|e| e.to_string())?;
    match fill_archive(ZipWriter::new(file), files) {
        Ok(added) => Ok(added),
        Err(e) => {
            // The writer is dropped by now; never leave a truncated archive behind.
            if let Err(remove_err) = std::fs::remove_file(zip_path) {
                warn!(path = %zip_path.display(), "Failed to remove incomplete archive: {remove_err}");
            } else {
                debug!(path = %zip_path.display(), "Removed incomplete archive");
            }
            Err(e)
        }
    }
}

fn fill_archive(mut zip: ZipWriter<File>, files: &[PathBuf]) -> Result<usize, String> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut added = 0_usize;
    for path in files {
        if !path.is_file() {
            warn!(path = %path.display(), "File not found, leaving it out of the archive");
            continue;
        }

        let entry_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| format!("'{}' has no file name", path.display()))?;

        zip.start_file(entry_name.as_str(), options)
            .map_err(|e| e.to_string())?;
        let mut source = File::open(path).map_err(|e| e.to_string())?;
        std::io::copy(&mut source, &mut zip).map_err(|e| e.to_string())?;
        debug!(path = %path.display(), entry = %entry_name, "Added file to archive");
        added = added.saturating_add(1);
    }

    zip.finish().map_err(|e| e.to_string())?;
    Ok(added)
}

#[async_trait]
impl ZipArchiver for DeflateZipArchiver {
    async fn create_zip(&self, zip_path: &Path, files: &[PathBuf]) -> crate::Result<()> {
        let target = zip_path.to_path_buf();
        let inputs = files.to_vec();

        let added = tokio::task::spawn_blocking(move || write_archive(&target, &inputs))
            .await
            .map_err(|e| ExportError::archive(e.to_string()))?
            .map_err(ExportError::archive)?;

        info!(path = %zip_path.display(), entries = added, "ZIP file created");
        Ok(())
    }
}
