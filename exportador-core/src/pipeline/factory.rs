//! Builds the context and step list of an export run.

use super::context::ExportContext;
use super::progress::{ExportObserver, ObserverProgressReporter};
use super::step::ExportStep;
use super::steps::{
    CleanupTemporaryFilesStep, CreateZipArchiveStep, GetSelectedTablesStep, ProcessTablesStep,
    SetupDatabaseViewsStep, ValidateConnectionStep,
};
use crate::services::{
    ConnectionParameterSource, CsvWriter, DataRetrieval, DatabaseSetup, ExportMappingRepository,
    ExportSettingsRepository, FileSystem, SelectionSource, ZipArchiver,
};
use std::sync::Arc;

/// Source of everything one export run needs.
pub trait ExportContextFactory: Send + Sync {
    /// Fresh context whose reporter fans out to `observer`.
    fn create_context(&self, observer: Arc<dyn ExportObserver>) -> ExportContext;

    /// Steps run by the orchestrator, in order.
    fn create_steps(&self) -> Vec<Box<dyn ExportStep>>;

    /// Step the use case runs after the orchestrator, whatever the outcome.
    fn create_cleanup_step(&self) -> Box<dyn ExportStep>;
}

/// Collaborators shared by the default steps.
#[derive(Clone)]
pub struct ExportServices {
    /// Connection parameters set by a successful connection test
    pub connection_parameters: Arc<dyn ConnectionParameterSource>,
    /// Entities picked by the operator
    pub selection: Arc<dyn SelectionSource>,
    /// View provisioning
    pub database_setup: Arc<dyn DatabaseSetup>,
    /// Row access
    pub data_retrieval: Arc<dyn DataRetrieval>,
    /// CSV output
    pub csv_writer: Arc<dyn CsvWriter>,
    /// Entity name to view lookup
    pub mapping: Arc<dyn ExportMappingRepository>,
    /// ZIP output
    pub zip_archiver: Arc<dyn ZipArchiver>,
    /// Destination directory and archive name
    pub settings: Arc<dyn ExportSettingsRepository>,
    /// Local files
    pub file_system: Arc<dyn FileSystem>,
}

/// Factory wiring the six standard steps.
pub struct DefaultExportContextFactory {
    services: ExportServices,
}

impl DefaultExportContextFactory {
    /// Creates the factory over a set of collaborators.
    pub fn new(services: ExportServices) -> Self {
        Self { services }
    }
}

impl ExportContextFactory for DefaultExportContextFactory {
    fn create_context(&self, observer: Arc<dyn ExportObserver>) -> ExportContext {
        ExportContext::new(Arc::new(ObserverProgressReporter::new(observer)))
    }

    fn create_steps(&self) -> Vec<Box<dyn ExportStep>> {
        let s = &self.services;
        vec![
            Box::new(ValidateConnectionStep::new(s.connection_parameters.clone())),
            Box::new(SetupDatabaseViewsStep::new(s.database_setup.clone())),
            Box::new(GetSelectedTablesStep::new(s.selection.clone())),
            Box::new(ProcessTablesStep::new(
                s.data_retrieval.clone(),
                s.csv_writer.clone(),
                s.mapping.clone(),
                s.file_system.clone(),
            )),
            Box::new(CreateZipArchiveStep::new(
                s.zip_archiver.clone(),
                s.settings.clone(),
                s.file_system.clone(),
            )),
        ]
    }

    fn create_cleanup_step(&self) -> Box<dyn ExportStep> {
        Box::new(CleanupTemporaryFilesStep::new(
            self.services.file_system.clone(),
        ))
    }
}
