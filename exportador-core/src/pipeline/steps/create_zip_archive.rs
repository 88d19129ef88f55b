use crate::error::ExportError;
use crate::pipeline::{ExportContext, ExportStep};
use crate::services::{ExportSettingsRepository, FileSystem, ZipArchiver};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Bundles the CSV files of this run into `<destination>/<name>.zip`.
pub struct CreateZipArchiveStep {
    archiver: Arc<dyn ZipArchiver>,
    settings: Arc<dyn ExportSettingsRepository>,
    fs: Arc<dyn FileSystem>,
}

impl CreateZipArchiveStep {
    /// Creates the step from its collaborators.
    pub fn new(
        archiver: Arc<dyn ZipArchiver>,
        settings: Arc<dyn ExportSettingsRepository>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            archiver,
            settings,
            fs,
        }
    }
}

#[async_trait]
impl ExportStep for CreateZipArchiveStep {
    fn name(&self) -> &'static str {
        "create-zip-archive"
    }

    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        context.report(85, "Compressing files...");

        if context.temporary_csv_file_paths.is_empty() {
            warn!("No CSV file was generated, skipping archive creation");
            return Ok(());
        }

        let destination = self.settings.destination_directory();
        if !self.fs.dir_exists(&destination) {
            self.fs.create_dir_all(&destination).await?;
        }

        let zip_path = destination.join(format!("{}.zip", self.settings.output_file_name()));
        context.final_zip_file_path = Some(zip_path.clone());

        if let Err(e) = self
            .archiver
            .create_zip(&zip_path, &context.temporary_csv_file_paths)
            .await
        {
            error!(path = %zip_path.display(), "Archive creation failed: {e}");
            context.final_zip_file_path = None;
            if self.fs.file_exists(&zip_path)
                && let Err(remove_err) = self.fs.remove_file(&zip_path).await
            {
                warn!(path = %zip_path.display(), "Failed to remove incomplete archive: {remove_err}");
            }
            return Err(match e {
                ExportError::Archive { .. } => e,
                other => ExportError::archive(other.to_string()),
            });
        }

        info!(
            path = %zip_path.display(),
            files = context.temporary_csv_file_paths.len(),
            "ZIP archive created"
        );
        context.report(95, "ZIP file created successfully.");
        Ok(())
    }
}
