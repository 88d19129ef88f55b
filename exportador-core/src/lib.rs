//! Core pipeline and collaborators for Exportador.
//!
//! Exportador copies selected SQL Server tables into semicolon-delimited CSV
//! files and bundles them into a single ZIP archive. This crate holds every
//! piece of that flow except the command-line front end:
//!
//! - `models`: value objects shared by the pipeline and its collaborators
//! - `security`: zeroizing password storage and validated connection parameters
//! - `services`: collaborator traits plus their local implementations
//! - `adapters`: the SQL Server adapter (feature `mssql`)
//! - `pipeline`: the export context, steps, orchestrator and use case
//!
//! # Security Guarantees
//! - Passwords are held in `Zeroizing` containers and wiped on drop
//! - Passwords never appear in `Debug`/`Display` output, logs or errors
//! - Connection parameter equality compares password presence only
//!
//! # Architecture
//! The export runs as an ordered list of steps sharing one mutable context.
//! The orchestrator stops at the first failing step, and the use case always
//! runs the cleanup step afterwards.

pub mod adapters;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod operations;
pub mod pipeline;
pub mod security;
pub mod services;

// Re-export commonly used types
pub use config::ExportConfig;
pub use error::{ExportError, Result};
pub use logging::{LogFormat, init_logging};
pub use models::{
    ConnectionTestResult, DataRow, DatabaseViewDefinition, ExportResultInfo, ExportStatus,
    ExportedTableInfo, TableMapping,
};
pub use pipeline::{
    ExportContext, ExportDataUseCase, ExportObserver, ExportOrchestrator, ExportStep,
    ProgressReporter,
};
pub use security::{ConnectionParameters, SecretPassword};
