//! Progress reporting from pipeline steps to the front end.

use crate::models::ExportStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;

/// Receives progress notifications for a running export.
///
/// Both channels fire for every report, message first.
pub trait ExportObserver: Send + Sync {
    /// New progress percentage, 0..=100.
    fn on_progress(&self, percentage: u8);

    /// New status message.
    fn on_status_message(&self, message: &str);
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ExportObserver for NullObserver {
    fn on_progress(&self, _percentage: u8) {}

    fn on_status_message(&self, _message: &str) {}
}

/// Sink for step progress.
pub trait ProgressReporter: Send + Sync {
    /// Publishes a status update.
    fn report(&self, status: ExportStatus);

    /// Percentage of the most recent report, 0 before the first one.
    fn last_percentage(&self) -> u8;
}

/// Forwards every report to an [`ExportObserver`].
pub struct ObserverProgressReporter {
    observer: Arc<dyn ExportObserver>,
    last_percentage: AtomicU8,
}

impl ObserverProgressReporter {
    /// Creates a reporter fanning out to `observer`.
    pub fn new(observer: Arc<dyn ExportObserver>) -> Self {
        Self {
            observer,
            last_percentage: AtomicU8::new(0),
        }
    }
}

impl ProgressReporter for ObserverProgressReporter {
    fn report(&self, status: ExportStatus) {
        debug!(
            percentage = status.percentage(),
            message = status.message(),
            "Export progress"
        );
        self.last_percentage
            .store(status.percentage(), Ordering::Relaxed);
        self.observer.on_status_message(status.message());
        self.observer.on_progress(status.percentage());
    }

    fn last_percentage(&self) -> u8 {
        self.last_percentage.load(Ordering::Relaxed)
    }
}
