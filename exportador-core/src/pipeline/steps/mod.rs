//! The six concrete export steps, in pipeline order.

mod cleanup_temporary_files;
mod create_zip_archive;
mod get_selected_tables;
mod process_tables;
mod setup_database_views;
mod validate_connection;

pub use cleanup_temporary_files::CleanupTemporaryFilesStep;
pub use create_zip_archive::CreateZipArchiveStep;
pub use get_selected_tables::GetSelectedTablesStep;
pub use process_tables::{PROCESS_END_PERCENT, PROCESS_START_PERCENT, ProcessTablesStep, progress_at};
pub use setup_database_views::SetupDatabaseViewsStep;
pub use validate_connection::{MISSING_PARAMETERS_MESSAGE, ValidateConnectionStep};
