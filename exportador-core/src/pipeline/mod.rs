//! The export pipeline: context, steps, orchestrator and use case.
//!
//! One run owns one [`ExportContext`]. The orchestrator executes the steps
//! built by an [`ExportContextFactory`] in order and stops at the first
//! failure; [`ExportDataUseCase`] then runs the cleanup step whatever the
//! outcome and saves a summary of successful runs.
//!
//! Progress ranges per step:
//!
//! | Step                   | Range  |
//! |------------------------|--------|
//! | validate connection    | 0–5    |
//! | setup database views   | 5–10   |
//! | get selected tables    | 10     |
//! | process tables         | 10–80  |
//! | create ZIP archive     | 85–95  |
//! | cleanup                | 98     |

pub mod context;
pub mod factory;
pub mod orchestrator;
pub mod progress;
pub mod step;
pub mod steps;
pub mod use_case;

pub use context::{ExportContext, TableRecordCounts};
pub use factory::{DefaultExportContextFactory, ExportContextFactory, ExportServices};
pub use orchestrator::ExportOrchestrator;
pub use progress::{ExportObserver, NullObserver, ObserverProgressReporter, ProgressReporter};
pub use step::ExportStep;
pub use steps::{
    CleanupTemporaryFilesStep, CreateZipArchiveStep, GetSelectedTablesStep, ProcessTablesStep,
    SetupDatabaseViewsStep, ValidateConnectionStep,
};
pub use use_case::ExportDataUseCase;
