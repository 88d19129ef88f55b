//! Wiring of the core collaborators for one CLI invocation.

use exportador_core::adapters::SqlServerAdapter;
use exportador_core::operations::{GetTableNames, ManageSelectedTables, TestDatabaseConnection};
use exportador_core::pipeline::{
    DefaultExportContextFactory, ExportDataUseCase, ExportObserver, ExportServices,
};
use exportador_core::services::{
    ConnectionParametersStore, DatabaseSetupService, DeflateZipArchiver, ExportMappingRepository,
    ExportResultRepository, FileExportResultRepository, FileSystem,
    InMemoryExportMappingRepository, JsonExportSettingsRepository, LocalFileSystem,
    SelectedTablesStore, SemicolonCsvWriter, StaticViewDefinitionProvider,
};
use exportador_core::{ConnectionTestResult, ExportConfig, ExportResultInfo};
use std::sync::Arc;
use tracing::debug;

/// Every collaborator of the export, built once per process.
pub struct App {
    adapter: Arc<SqlServerAdapter>,
    parameters: Arc<ConnectionParametersStore>,
    selection: Arc<SelectedTablesStore>,
    mapping: Arc<InMemoryExportMappingRepository>,
    settings: Arc<JsonExportSettingsRepository>,
    results: Arc<FileExportResultRepository>,
    fs: Arc<dyn FileSystem>,
    config: ExportConfig,
}

impl App {
    /// Builds the collaborators from a validated configuration.
    ///
    /// # Errors
    /// Fails when the configuration is invalid.
    pub fn new(config: ExportConfig) -> exportador_core::Result<Self> {
        config.validate()?;
        debug!(storage = %config.storage_dir.display(), "Initializing collaborators");

        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::with_temp_dir(config.temp_dir.clone()));
        Ok(Self {
            adapter: Arc::new(SqlServerAdapter::new(config.clone())),
            parameters: Arc::new(ConnectionParametersStore::new()),
            selection: Arc::new(SelectedTablesStore::new()),
            mapping: Arc::new(InMemoryExportMappingRepository::new()),
            settings: Arc::new(JsonExportSettingsRepository::load(&config.storage_dir)),
            results: Arc::new(FileExportResultRepository::new(fs.clone(), &config.storage_dir)),
            fs,
            config,
        })
    }

    /// Destination and archive name settings.
    pub fn settings(&self) -> &JsonExportSettingsRepository {
        &self.settings
    }

    /// Friendly names of every exportable entity.
    pub fn entities(&self) -> Vec<String> {
        self.mapping.friendly_names()
    }

    /// Tests the raw connection input; success stores the parameters.
    pub async fn test_connection(
        &self,
        server: &str,
        database: &str,
        user: &str,
        password: &str,
    ) -> ConnectionTestResult {
        TestDatabaseConnection::new(self.adapter.clone(), self.parameters.clone())
            .execute(server, database, user, password)
            .await
    }

    /// Lists tables of the tested connection.
    ///
    /// # Errors
    /// Fails without stored parameters or when the query fails.
    pub async fn table_names(&self, like_pattern: &str) -> exportador_core::Result<Vec<String>> {
        GetTableNames::new(self.parameters.clone(), self.adapter.clone())
            .execute(like_pattern)
            .await
    }

    /// Entity selection of the next export.
    pub fn selection(&self) -> ManageSelectedTables {
        ManageSelectedTables::new(self.selection.clone())
    }

    /// Runs the export, reporting progress to `observer`.
    ///
    /// # Errors
    /// Returns the first fatal pipeline error.
    pub async fn export(
        &self,
        observer: Arc<dyn ExportObserver>,
    ) -> exportador_core::Result<ExportResultInfo> {
        let views = StaticViewDefinitionProvider::new();
        let services = ExportServices {
            connection_parameters: self.parameters.clone(),
            selection: self.selection.clone(),
            database_setup: Arc::new(DatabaseSetupService::new(
                self.adapter.clone(),
                &views,
                self.config.view_settle_delay,
            )),
            data_retrieval: self.adapter.clone(),
            csv_writer: Arc::new(SemicolonCsvWriter::new()),
            mapping: self.mapping.clone(),
            zip_archiver: Arc::new(DeflateZipArchiver::new()),
            settings: self.settings.clone(),
            file_system: self.fs.clone(),
        };

        let use_case = ExportDataUseCase::new(
            Arc::new(DefaultExportContextFactory::new(services)),
            self.results.clone(),
            self.fs.clone(),
            observer,
        );
        use_case.execute_export().await
    }

    /// Summary of the most recent successful export.
    ///
    /// # Errors
    /// Fails when the stored summary cannot be read.
    pub async fn latest_result(&self) -> exportador_core::Result<Option<ExportResultInfo>> {
        self.results.load_latest().await
    }
}
