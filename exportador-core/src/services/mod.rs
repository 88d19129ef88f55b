//! Collaborator traits used by the export pipeline, plus local implementations.
//!
//! The pipeline only sees these traits. Database-facing traits are implemented
//! by the SQL Server adapter; everything else lives in this module:
//!
//! - `stores`: connection parameter and entity selection stores
//! - `mapping`: friendly entity name → view and column list
//! - `views`: SELECT bodies of the export views
//! - `database_setup`: drop/create/refresh of every export view
//! - `csv_writer`: semicolon-delimited CSV writer
//! - `archive`: Deflate ZIP writer
//! - `filesystem`: local file system access
//! - `result_repository`: `export_result.json` persistence
//! - `settings`: destination directory and output file name
//!
//! # Object Safety
//! Every trait is object-safe and `Send + Sync` so collaborators can be
//! shared as `Arc<dyn Trait>` between the CLI and the pipeline steps.

use crate::Result;
use crate::models::{DataRow, DatabaseViewDefinition, ExportResultInfo, TableMapping};
use crate::security::ConnectionParameters;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod archive;
pub mod csv_writer;
pub mod database_setup;
pub mod filesystem;
pub mod mapping;
pub mod result_repository;
pub mod settings;
pub mod stores;
pub mod views;

pub use archive::DeflateZipArchiver;
pub use csv_writer::SemicolonCsvWriter;
pub use database_setup::DatabaseSetupService;
pub use filesystem::LocalFileSystem;
pub use mapping::InMemoryExportMappingRepository;
pub use result_repository::FileExportResultRepository;
pub use settings::{ExportSettings, JsonExportSettingsRepository};
pub use stores::{ConnectionParametersStore, SelectedTablesStore};
pub use views::StaticViewDefinitionProvider;

/// Source of the connection parameters for the current session.
pub trait ConnectionParameterSource: Send + Sync {
    /// Returns true once parameters were stored.
    fn has_parameters(&self) -> bool;

    /// Snapshot of the stored parameters.
    fn current_parameters(&self) -> Option<ConnectionParameters>;
}

/// Source of the entity names the operator picked for export.
pub trait SelectionSource: Send + Sync {
    /// Selected friendly names in selection order.
    fn selected_entity_names(&self) -> Vec<String>;
}

/// Lookup from friendly entity name to its data source.
pub trait ExportMappingRepository: Send + Sync {
    /// Mapping for `friendly_name`, `None` when the entity is unknown.
    fn get_mapping(&self, friendly_name: &str) -> Option<TableMapping>;

    /// Every known friendly name, in presentation order.
    fn friendly_names(&self) -> Vec<String>;
}

/// Definitions of the views an export depends on.
pub trait ViewDefinitionProvider: Send + Sync {
    /// Views in creation order.
    fn required_views(&self) -> Vec<DatabaseViewDefinition>;
}

/// Makes sure every export view exists and is current.
#[async_trait]
pub trait DatabaseSetup: Send + Sync {
    /// Recreates and refreshes every required view.
    ///
    /// # Errors
    /// Returns the first provisioning failure; views already recreated stay.
    async fn setup_required_views(&self, params: &ConnectionParameters) -> Result<()>;
}

/// DDL access to the target database.
#[async_trait]
pub trait SchemaManagement: Send + Sync {
    /// Drops the view when present and creates it from its definition.
    async fn create_or_alter_view(
        &self,
        params: &ConnectionParameters,
        view: &DatabaseViewDefinition,
    ) -> Result<()>;

    /// Runs a statement that returns no rows.
    async fn execute_sql_command(&self, params: &ConnectionParameters, sql: &str) -> Result<()>;
}

/// Row access to the target database.
#[async_trait]
pub trait DataRetrieval: Send + Sync {
    /// Reads every row of `table_name`.
    ///
    /// `schema.table` names are bracket-quoted per part; a blank `columns`
    /// list selects every column.
    ///
    /// # Errors
    /// Returns an error when the table is missing or the query fails.
    async fn get_data_from_table(
        &self,
        params: &ConnectionParameters,
        table_name: &str,
        columns: &str,
    ) -> Result<Vec<DataRow>>;
}

/// Lists base tables of the target database.
#[async_trait]
pub trait TableDiscovery: Send + Sync {
    /// `schema.table` names matching the `LIKE` pattern, sorted.
    async fn get_table_names(
        &self,
        params: &ConnectionParameters,
        like_pattern: &str,
    ) -> Result<Vec<String>>;
}

/// Opens a connection to prove the parameters work.
#[async_trait]
pub trait ConnectionTester: Send + Sync {
    /// Connects and runs `SELECT 1`.
    async fn test_connection(&self, params: &ConnectionParameters) -> Result<()>;
}

/// Writes rows as a CSV file.
#[async_trait]
pub trait CsvWriter: Send + Sync {
    /// Writes `rows` to `path`, creating parent directories.
    async fn write_csv(&self, path: &Path, rows: &[DataRow]) -> Result<()>;
}

/// Bundles files into a ZIP archive.
#[async_trait]
pub trait ZipArchiver: Send + Sync {
    /// Creates `zip_path` with one entry per existing file in `files`.
    ///
    /// # Errors
    /// Returns [`ExportError::Archive`](crate::ExportError::Archive) on any
    /// I/O or ZIP failure.
    async fn create_zip(&self, zip_path: &Path, files: &[PathBuf]) -> Result<()>;
}

/// File system access used by the pipeline.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Scratch directory for temporary CSV files.
    fn temp_dir(&self) -> PathBuf;

    /// Returns true when `path` is an existing file.
    fn file_exists(&self, path: &Path) -> bool;

    /// Returns true when `path` is an existing directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// Creates `path` and its parents; a no-op when it exists.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Deletes a file.
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// Size of a file in bytes.
    async fn file_size(&self, path: &Path) -> Result<u64>;

    /// Reads a whole UTF-8 file.
    async fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Creates or truncates `path` with `contents`.
    async fn write_string(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Persistence of the latest export summary.
#[async_trait]
pub trait ExportResultRepository: Send + Sync {
    /// Overwrites the stored summary.
    async fn save(&self, result: &ExportResultInfo) -> Result<()>;

    /// The stored summary, `None` when nothing was saved yet.
    async fn load_latest(&self) -> Result<Option<ExportResultInfo>>;
}

/// Destination directory and archive name of the next export.
pub trait ExportSettingsRepository: Send + Sync {
    /// Directory the archive is written to.
    fn destination_directory(&self) -> PathBuf;

    /// Persists a new destination directory.
    fn set_destination_directory(&self, path: &Path) -> Result<()>;

    /// Archive file name without extension.
    fn output_file_name(&self) -> String;

    /// Persists a new archive file name.
    fn set_output_file_name(&self, file_name: &str) -> Result<()>;
}
