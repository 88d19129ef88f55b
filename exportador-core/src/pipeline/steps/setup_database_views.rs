use super::validate_connection::MISSING_PARAMETERS_MESSAGE;
use crate::error::ExportError;
use crate::pipeline::{ExportContext, ExportStep};
use crate::services::DatabaseSetup;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// Recreates the export views before any data is read.
///
/// A provisioning failure is fatal for the run.
pub struct SetupDatabaseViewsStep {
    setup: Arc<dyn DatabaseSetup>,
}

impl SetupDatabaseViewsStep {
    /// Creates the step over a setup service.
    pub fn new(setup: Arc<dyn DatabaseSetup>) -> Self {
        Self { setup }
    }
}

#[async_trait]
impl ExportStep for SetupDatabaseViewsStep {
    fn name(&self) -> &'static str {
        "setup-database-views"
    }

    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        context.report(5, "Configuring and verifying export views...");

        let params = context
            .connection_parameters
            .clone()
            .ok_or_else(|| ExportError::configuration(MISSING_PARAMETERS_MESSAGE))?;

        if let Err(e) = self.setup.setup_required_views(&params).await {
            error!("View setup failed: {e}");
            return Err(match e {
                ExportError::SchemaSetup { .. } => e,
                other => ExportError::schema_setup(other.to_string()),
            });
        }

        context.report(10, "Views configured successfully.");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::steps::test_support::{params, recording_context};
    use crate::security::ConnectionParameters;

    struct FixedSetup(Option<&'static str>);

    #[async_trait]
    impl DatabaseSetup for FixedSetup {
        async fn setup_required_views(&self, _params: &ConnectionParameters) -> crate::Result<()> {
            match self.0 {
                Some(message) => Err(ExportError::query_failed(message)),
                None => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn test_success_reports_configured() {
        let step = SetupDatabaseViewsStep::new(Arc::new(FixedSetup(None)));
        let (mut context, observer) = recording_context();
        context.connection_parameters = Some(params());

        step.execute(&mut context).await.unwrap();

        assert_eq!(observer.percentages(), vec![5, 10]);
        assert_eq!(observer.messages().last().unwrap(), "Views configured successfully.");
    }

    #[tokio::test]
    async fn test_failure_becomes_schema_setup_error() {
        let step = SetupDatabaseViewsStep::new(Arc::new(FixedSetup(Some("permission denied"))));
        let (mut context, observer) = recording_context();
        context.connection_parameters = Some(params());

        let err = step.execute(&mut context).await.unwrap_err();

        assert!(matches!(err, ExportError::SchemaSetup { .. }));
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(observer.percentages(), vec![5]);
    }
}
