use super::validate_connection::MISSING_PARAMETERS_MESSAGE;
use crate::error::ExportError;
use crate::pipeline::{ExportContext, ExportStep};
use crate::services::{CsvWriter, DataRetrieval, ExportMappingRepository, FileSystem};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Progress reported before the first table.
pub const PROCESS_START_PERCENT: u8 = 10;
/// Progress reported once every table was handled.
pub const PROCESS_END_PERCENT: u8 = 80;

/// Progress for table `index` of `total`, linear over the processing range.
pub fn progress_at(index: usize, total: usize) -> u8 {
    if total == 0 {
        return PROCESS_START_PERCENT;
    }
    let span = usize::from(PROCESS_END_PERCENT - PROCESS_START_PERCENT);
    let offset = index.min(total).saturating_mul(span) / total;
    PROCESS_START_PERCENT.saturating_add(u8::try_from(offset).unwrap_or(u8::MAX))
}

fn unexpected_message(name: &str) -> String {
    format!("Unexpected error while processing '{name}'. Check the logs.")
}

/// Reads every selected entity and writes one CSV file per entity.
///
/// Failures are isolated per table: an unmapped entity, a failed query, a
/// failed write or a panicking collaborator skips that table and the loop
/// continues.
pub struct ProcessTablesStep {
    retrieval: Arc<dyn DataRetrieval>,
    csv_writer: Arc<dyn CsvWriter>,
    mapping: Arc<dyn ExportMappingRepository>,
    fs: Arc<dyn FileSystem>,
}

impl ProcessTablesStep {
    /// Creates the step from its collaborators.
    pub fn new(
        retrieval: Arc<dyn DataRetrieval>,
        csv_writer: Arc<dyn CsvWriter>,
        mapping: Arc<dyn ExportMappingRepository>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            retrieval,
            csv_writer,
            mapping,
            fs,
        }
    }
}

#[async_trait]
impl ExportStep for ProcessTablesStep {
    fn name(&self) -> &'static str {
        "process-tables"
    }

    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        let names = context.selected_friendly_table_names.clone();
        if names.is_empty() {
            debug!("No tables to process");
            return Ok(());
        }

        let params = context
            .connection_parameters
            .clone()
            .ok_or_else(|| ExportError::configuration(MISSING_PARAMETERS_MESSAGE))?;
        let temp_dir = self.fs.temp_dir();
        let total = names.len();

        for (index, name) in names.iter().enumerate() {
            context.report(progress_at(index, total), format!("Processing: {name}..."));

            let Some(mapping) = self.mapping.get_mapping(name) else {
                warn!(table = %name, "No export mapping registered, skipping");
                continue;
            };

            let fetched = AssertUnwindSafe(self.retrieval.get_data_from_table(
                &params,
                &mapping.real_table_name,
                &mapping.columns,
            ))
            .catch_unwind()
            .await;
            let rows = match fetched {
                Ok(Ok(rows)) => rows,
                Err(payload) => {
                    let e = ExportError::from_panic(payload.as_ref());
                    error!(table = %name, source = %mapping.real_table_name, "Read failed: {e}");
                    context.report(progress_at(index, total), unexpected_message(name));
                    continue;
                }
                Ok(Err(e)) => {
                    error!(table = %name, source = %mapping.real_table_name, "Query failed: {e}");
                    context.report(
                        progress_at(index, total),
                        format!("Table '{name}' not found or invalid. Skipped."),
                    );
                    continue;
                }
            };

            context
                .sql_records_count_per_table
                .insert(name, rows.len() as u64);

            let csv_path = temp_dir.join(format!("{name}.csv"));
            let written = AssertUnwindSafe(self.csv_writer.write_csv(&csv_path, &rows))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ExportError::from_panic(payload.as_ref())));
            match written {
                Ok(()) => {
                    info!(table = %name, rows = rows.len(), path = %csv_path.display(), "CSV written");
                    context.temporary_csv_file_paths.push(csv_path);
                }
                Err(e) => {
                    error!(table = %name, path = %csv_path.display(), "CSV write failed: {e}");
                    context.report(progress_at(index, total), unexpected_message(name));
                    context.sql_records_count_per_table.remove(name);
                    if self.fs.file_exists(&csv_path)
                        && let Err(e) = self.fs.remove_file(&csv_path).await
                    {
                        warn!(path = %csv_path.display(), "Could not delete partial CSV: {e}");
                    }
                }
            }
        }

        context.report(PROCESS_END_PERCENT, "CSV file generation completed.");
        Ok(())
    }
}
