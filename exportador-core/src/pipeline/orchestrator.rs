//! Sequential executor of the export steps.

use super::context::ExportContext;
use super::step::ExportStep;
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs an ordered list of steps against one context.
///
/// The first failing step stops the run and its error is returned
/// unchanged. Effects of the steps that already ran are kept.
#[derive(Default)]
pub struct ExportOrchestrator {
    steps: Vec<Box<dyn ExportStep>>,
}

impl ExportOrchestrator {
    /// Creates an orchestrator with no steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the step list.
    pub fn set_steps(&mut self, steps: Vec<Box<dyn ExportStep>>) {
        self.steps = steps;
    }

    /// Names of the installed steps, in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Executes every step in order.
    ///
    /// # Errors
    /// Returns the error of the first failing step.
    pub async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        for step in &self.steps {
            let started = Instant::now();
            debug!(step = step.name(), "Starting export step");

            if let Err(e) = step.execute(context).await {
                error!(step = step.name(), "Export step failed: {e}");
                return Err(e);
            }

            debug!(
                step = step.name(),
                elapsed_ms = started.elapsed().as_millis(),
                "Export step finished"
            );
        }

        info!(steps = self.steps.len(), "All export steps completed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::pipeline::steps::test_support::recording_context;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct ScriptedStep {
        name: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ExportStep for ScriptedStep {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn execute(&self, _context: &mut ExportContext) -> crate::Result<()> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(ExportError::configuration(format!("{} failed", self.name)));
            }
            Ok(())
        }
    }

    fn scripted(
        names: &[&'static str],
        failing: Option<&'static str>,
    ) -> (ExportOrchestrator, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = names
            .iter()
            .map(|&name| {
                Box::new(ScriptedStep {
                    name,
                    fail: failing == Some(name),
                    log: log.clone(),
                }) as Box<dyn ExportStep>
            })
            .collect();
        let mut orchestrator = ExportOrchestrator::new();
        orchestrator.set_steps(steps);
        (orchestrator, log)
    }

    #[tokio::test]
    async fn test_runs_steps_in_order() {
        let (orchestrator, log) = scripted(&["a", "b", "c"], None);
        let (mut context, _) = recording_context();

        orchestrator.execute(&mut context).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(orchestrator.step_names(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let (orchestrator, log) = scripted(&["a", "b", "c"], Some("b"));
        let (mut context, _) = recording_context();

        let err = orchestrator.execute(&mut context).await.unwrap_err();

        assert_eq!(err.to_string(), "b failed");
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_orchestrator_succeeds() {
        let orchestrator = ExportOrchestrator::new();
        let (mut context, _) = recording_context();
        orchestrator.execute(&mut context).await.unwrap();
    }
}
