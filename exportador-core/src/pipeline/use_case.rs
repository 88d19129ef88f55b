//! Top-level entry point of an export run.

use super::context::ExportContext;
use super::factory::ExportContextFactory;
use super::orchestrator::ExportOrchestrator;
use super::progress::ExportObserver;
use crate::error::ExportError;
use crate::models::{ExportResultInfo, ExportedTableInfo, NO_ARCHIVE};
use crate::services::{ExportResultRepository, FileSystem};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Clears the in-progress flag when the run ends, however it ends.
struct ExportingGuard<'a>(&'a AtomicBool);

impl<'a> ExportingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ExportingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs one export end to end.
///
/// Builds a fresh context and step list per run, executes the steps,
/// always runs the cleanup step afterwards, and saves a summary of every
/// successful run. Overlapping runs are refused.
pub struct ExportDataUseCase {
    factory: Arc<dyn ExportContextFactory>,
    result_repository: Arc<dyn ExportResultRepository>,
    fs: Arc<dyn FileSystem>,
    observer: Arc<dyn ExportObserver>,
    orchestrator: Mutex<ExportOrchestrator>,
    is_exporting: AtomicBool,
}

impl ExportDataUseCase {
    /// Creates the use case; progress of every run goes to `observer`.
    pub fn new(
        factory: Arc<dyn ExportContextFactory>,
        result_repository: Arc<dyn ExportResultRepository>,
        fs: Arc<dyn FileSystem>,
        observer: Arc<dyn ExportObserver>,
    ) -> Self {
        Self {
            factory,
            result_repository,
            fs,
            observer,
            orchestrator: Mutex::new(ExportOrchestrator::new()),
            is_exporting: AtomicBool::new(false),
        }
    }

    /// Returns true while a run is active.
    pub fn is_exporting(&self) -> bool {
        self.is_exporting.load(Ordering::Acquire)
    }

    /// Executes the export pipeline.
    ///
    /// # Errors
    /// Returns [`ExportError::ExportInProgress`] when another run is active,
    /// otherwise the error of the first failing step. The cleanup step has
    /// run by the time either error is returned.
    pub async fn execute_export(&self) -> crate::Result<ExportResultInfo> {
        let Some(_guard) = ExportingGuard::acquire(&self.is_exporting) else {
            warn!("Export requested while another run is active");
            return Err(ExportError::ExportInProgress);
        };

        let mut context = self.factory.create_context(self.observer.clone());
        let cleanup = self.factory.create_cleanup_step();

        let mut orchestrator = self.orchestrator.lock().await;
        orchestrator.set_steps(self.factory.create_steps());
        info!(steps = ?orchestrator.step_names(), "Export started");

        let started = Instant::now();
        // A panicking step must not skip cleanup.
        let outcome = AssertUnwindSafe(orchestrator.execute(&mut context))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ExportError::from_panic(payload.as_ref())));

        if let Err(e) = cleanup.execute(&mut context).await {
            warn!("Cleanup step reported an error: {e}");
        }
        let elapsed = started.elapsed();

        if let Err(e) = outcome {
            error!(elapsed_ms = elapsed.as_millis(), "Export failed: {e}");
            context.report(context.progress_reporter().last_percentage(), e.to_string());
            return Err(e);
        }

        let result = self.build_result(&context, elapsed).await;
        if let Err(e) = self.result_repository.save(&result).await {
            error!("Failed to save export summary: {e}");
        }

        info!(
            zip = %result.zip_file_name,
            tables = result.exported_tables.len(),
            records = result.total_records(),
            elapsed_ms = elapsed.as_millis(),
            "Export completed"
        );
        context.report(100, "Export completed successfully.");
        Ok(result)
    }

    async fn build_result(&self, context: &ExportContext, elapsed: Duration) -> ExportResultInfo {
        let zip_path = context.final_zip_file_path.as_deref();

        let zip_file_name = zip_path
            .and_then(|path| path.file_name())
            .map_or_else(|| NO_ARCHIVE.to_string(), |name| name.to_string_lossy().into_owned());

        let zip_file_size_bytes = match zip_path {
            Some(path) if self.fs.file_exists(path) => {
                self.fs.file_size(path).await.unwrap_or_else(|e| {
                    warn!(path = %path.display(), "Could not read archive size: {e}");
                    0
                })
            }
            _ => 0,
        };

        let exported_tables = context
            .sql_records_count_per_table
            .iter()
            .map(|(name, count)| ExportedTableInfo {
                table_name: name.to_string(),
                sql_records_count: count,
            })
            .collect();

        ExportResultInfo {
            exported_tables,
            zip_file_name,
            zip_file_size_bytes,
            total_export_time: elapsed,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::progress::NullObserver;
    use crate::pipeline::step::ExportStep;
    use crate::services::{FileExportResultRepository, LocalFileSystem};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Step that waits until released, so a second run can be attempted.
    struct BlockingStep {
        release: Arc<tokio::sync::Notify>,
        entered: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl ExportStep for BlockingStep {
        fn name(&self) -> &'static str {
            "blocking"
        }

        async fn execute(&self, _context: &mut ExportContext) -> crate::Result<()> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    struct CountingStep(Arc<AtomicUsize>);

    #[async_trait]
    impl ExportStep for CountingStep {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn execute(&self, _context: &mut ExportContext) -> crate::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct PanickingStep;

    #[async_trait]
    impl ExportStep for PanickingStep {
        fn name(&self) -> &'static str {
            "panicking"
        }

        #[allow(clippy::panic)]
        async fn execute(&self, _context: &mut ExportContext) -> crate::Result<()> {
            panic!("view definition missing");
        }
    }

    struct PanickingFactory {
        cleanups: Arc<AtomicUsize>,
    }

    impl ExportContextFactory for PanickingFactory {
        fn create_context(&self, observer: Arc<dyn ExportObserver>) -> ExportContext {
            ExportContext::new(Arc::new(
                crate::pipeline::progress::ObserverProgressReporter::new(observer),
            ))
        }

        fn create_steps(&self) -> Vec<Box<dyn ExportStep>> {
            vec![Box::new(PanickingStep)]
        }

        fn create_cleanup_step(&self) -> Box<dyn ExportStep> {
            Box::new(CountingStep(self.cleanups.clone()))
        }
    }

    struct BlockingFactory {
        release: Arc<tokio::sync::Notify>,
        entered: Arc<tokio::sync::Notify>,
        cleanups: Arc<AtomicUsize>,
    }

    impl ExportContextFactory for BlockingFactory {
        fn create_context(&self, observer: Arc<dyn ExportObserver>) -> ExportContext {
            ExportContext::new(Arc::new(
                crate::pipeline::progress::ObserverProgressReporter::new(observer),
            ))
        }

        fn create_steps(&self) -> Vec<Box<dyn ExportStep>> {
            vec![Box::new(BlockingStep {
                release: self.release.clone(),
                entered: self.entered.clone(),
            })]
        }

        fn create_cleanup_step(&self) -> Box<dyn ExportStep> {
            Box::new(CountingStep(self.cleanups.clone()))
        }
    }

    #[tokio::test]
    async fn test_overlapping_run_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let entered = Arc::new(tokio::sync::Notify::new());
        let cleanups = Arc::new(AtomicUsize::new(0));
        let use_case = Arc::new(ExportDataUseCase::new(
            Arc::new(BlockingFactory {
                release: release.clone(),
                entered: entered.clone(),
                cleanups: cleanups.clone(),
            }),
            Arc::new(FileExportResultRepository::new(fs.clone(), temp.path())),
            fs,
            Arc::new(NullObserver),
        ));

        let first = tokio::spawn({
            let use_case = use_case.clone();
            async move { use_case.execute_export().await }
        });
        entered.notified().await;
        assert!(use_case.is_exporting());

        let err = use_case.execute_export().await.unwrap_err();
        assert!(matches!(err, ExportError::ExportInProgress));

        release.notify_one();
        let result = first.await.unwrap().unwrap();

        assert_eq!(result.zip_file_name, NO_ARCHIVE);
        assert_eq!(result.zip_file_size_bytes, 0);
        assert!(!use_case.is_exporting());
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_step_still_runs_cleanup() {
        let temp = tempfile::tempdir().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new());
        let results = Arc::new(FileExportResultRepository::new(fs.clone(), temp.path()));
        let cleanups = Arc::new(AtomicUsize::new(0));
        let use_case = ExportDataUseCase::new(
            Arc::new(PanickingFactory {
                cleanups: cleanups.clone(),
            }),
            results.clone(),
            fs,
            Arc::new(NullObserver),
        );

        let err = use_case.execute_export().await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "An unexpected error occurred: view definition missing"
        );
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(!use_case.is_exporting());
        assert!(results.load_latest().await.unwrap().is_none());

        // The use case stays usable after the panic.
        assert!(use_case.execute_export().await.is_err());
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);
    }
}
