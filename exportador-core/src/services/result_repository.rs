//! Single-slot persistence of the latest export summary.

use super::{ExportResultRepository, FileSystem};
use crate::error::ExportError;
use crate::models::ExportResultInfo;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// File name of the persisted summary inside the storage directory.
pub const RESULT_FILE_NAME: &str = "export_result.json";

/// Stores the summary as pretty-printed JSON, overwriting it on every save.
pub struct FileExportResultRepository {
    fs: Arc<dyn FileSystem>,
    storage_dir: PathBuf,
    file_path: PathBuf,
}

impl FileExportResultRepository {
    /// Repository writing `<storage_dir>/export_result.json`.
    pub fn new(fs: Arc<dyn FileSystem>, storage_dir: impl Into<PathBuf>) -> Self {
        let storage_dir = storage_dir.into();
        let file_path = storage_dir.join(RESULT_FILE_NAME);
        Self {
            fs,
            storage_dir,
            file_path,
        }
    }

    /// Full path of the summary file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait]
impl ExportResultRepository for FileExportResultRepository {
    async fn save(&self, result: &ExportResultInfo) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| ExportError::serialization("Failed to serialize export result", e))?;

        if !self.fs.dir_exists(&self.storage_dir) {
            self.fs.create_dir_all(&self.storage_dir).await?;
        }
        self.fs.write_string(&self.file_path, &json).await?;
        debug!(path = %self.file_path.display(), "Export result saved");
        Ok(())
    }

    async fn load_latest(&self) -> crate::Result<Option<ExportResultInfo>> {
        if !self.fs.file_exists(&self.file_path) {
            return Ok(None);
        }

        let json = self.fs.read_to_string(&self.file_path).await?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| ExportError::serialization("Failed to parse export result", e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::ExportedTableInfo;
    use crate::services::LocalFileSystem;
    use chrono::Utc;
    use std::time::Duration;

    fn result(count: u64) -> ExportResultInfo {
        ExportResultInfo {
            exported_tables: vec![ExportedTableInfo {
                table_name: "Clientes".to_string(),
                sql_records_count: count,
            }],
            zip_file_name: "backup.zip".to_string(),
            zip_file_size_bytes: 2048,
            total_export_time: Duration::from_secs(3),
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_latest_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileExportResultRepository::new(Arc::new(LocalFileSystem::new()), dir.path());
        assert!(repo.load_latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("state");
        let repo = FileExportResultRepository::new(Arc::new(LocalFileSystem::new()), &storage);

        repo.save(&result(3)).await.unwrap();
        repo.save(&result(9)).await.unwrap();

        assert!(repo.file_path().ends_with("export_result.json"));
        let latest = repo.load_latest().await.unwrap().unwrap();
        assert_eq!(latest.total_records(), 9);
        assert_eq!(latest.zip_file_name, "backup.zip");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RESULT_FILE_NAME), "{ not json").unwrap();
        let repo = FileExportResultRepository::new(Arc::new(LocalFileSystem::new()), dir.path());

        let err = repo.load_latest().await.unwrap_err();
        assert!(matches!(err, ExportError::Serialization { .. }));
    }
}
