use crate::pipeline::{ExportContext, ExportStep};
use crate::services::FileSystem;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Deletes the CSV files of this run.
///
/// Never fails: a file that cannot be deleted is logged and left behind.
/// Running it twice on the same context is harmless since the path list is
/// drained on the first run.
pub struct CleanupTemporaryFilesStep {
    fs: Arc<dyn FileSystem>,
}

impl CleanupTemporaryFilesStep {
    /// Creates the step over a file system.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl ExportStep for CleanupTemporaryFilesStep {
    fn name(&self) -> &'static str {
        "cleanup-temporary-files"
    }

    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        context.report(98, "Finalizing and cleaning up temporary files...");

        for path in std::mem::take(&mut context.temporary_csv_file_paths) {
            if !self.fs.file_exists(&path) {
                continue;
            }
            match self.fs.remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Temporary file deleted"),
                Err(e) => warn!(path = %path.display(), "Could not delete temporary file: {e}"),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::steps::test_support::recording_context;
    use crate::services::LocalFileSystem;

    #[tokio::test]
    async fn test_files_removed_and_list_drained() {
        let temp = tempfile::tempdir().unwrap();
        let csv = temp.path().join("Clientes.csv");
        std::fs::write(&csv, "a\r\n").unwrap();
        let step = CleanupTemporaryFilesStep::new(Arc::new(LocalFileSystem::new()));
        let (mut context, observer) = recording_context();
        context.temporary_csv_file_paths = vec![csv.clone(), temp.path().join("gone.csv")];

        step.execute(&mut context).await.unwrap();

        assert!(!csv.exists());
        assert!(context.temporary_csv_file_paths.is_empty());
        assert_eq!(observer.percentages(), vec![98]);
    }

    #[tokio::test]
    async fn test_second_run_is_harmless() {
        let step = CleanupTemporaryFilesStep::new(Arc::new(LocalFileSystem::new()));
        let (mut context, _) = recording_context();

        step.execute(&mut context).await.unwrap();
        step.execute(&mut context).await.unwrap();

        assert!(context.temporary_csv_file_paths.is_empty());
    }
}
