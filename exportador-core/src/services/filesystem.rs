//! Local file system access backed by `tokio::fs`.

use super::FileSystem;
use crate::error::ExportError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// [`FileSystem`] over the local disk.
///
/// The scratch directory is the OS temp directory unless overridden.
#[derive(Debug, Default, Clone)]
pub struct LocalFileSystem {
    temp_dir: Option<PathBuf>,
}

impl LocalFileSystem {
    /// Uses the OS temp directory for scratch files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `dir` for scratch files instead of the OS temp directory.
    pub fn with_temp_dir(dir: Option<PathBuf>) -> Self {
        Self { temp_dir: dir }
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    async fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            ExportError::io(format!("Failed to create directory '{}'", path.display()), e)
        })
    }

    async fn remove_file(&self, path: &Path) -> crate::Result<()> {
        tokio::fs::remove_file(path).await.map_err(|e| {
            ExportError::io(format!("Failed to delete file '{}'", path.display()), e)
        })
    }

    async fn file_size(&self, path: &Path) -> crate::Result<u64> {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.len())
            .map_err(|e| ExportError::io(format!("Failed to stat '{}'", path.display()), e))
    }

    async fn read_to_string(&self, path: &Path) -> crate::Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ExportError::io(format!("Failed to read '{}'", path.display()), e))
    }

    async fn write_string(&self, path: &Path, contents: &str) -> crate::Result<()> {
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| ExportError::io(format!("Failed to write '{}'", path.display()), e))
    }
}
