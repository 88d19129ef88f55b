use crate::error::ExportError;
use crate::pipeline::{ExportContext, ExportStep};
use crate::services::ConnectionParameterSource;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Failure text when no connection parameters were configured.
pub const MISSING_PARAMETERS_MESSAGE: &str =
    "Failed to obtain connection parameters. Please configure and test the connection.";

/// Copies the stored connection parameters into the context.
///
/// Makes no network call; the connection itself is proven by the
/// connection test before an export starts.
pub struct ValidateConnectionStep {
    source: Arc<dyn ConnectionParameterSource>,
}

impl ValidateConnectionStep {
    /// Creates the step over a parameter source.
    pub fn new(source: Arc<dyn ConnectionParameterSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ExportStep for ValidateConnectionStep {
    fn name(&self) -> &'static str {
        "validate-connection"
    }

    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        context.report(0, "Checking connection parameters...");

        let params = if self.source.has_parameters() {
            self.source.current_parameters()
        } else {
            None
        };

        let Some(params) = params else {
            error!("No connection parameters available");
            return Err(ExportError::configuration(MISSING_PARAMETERS_MESSAGE));
        };

        info!(server = %params, "Connection parameters verified");
        context.connection_parameters = Some(params);
        context.report(5, "Connection parameters verified.");
        Ok(())
    }
}
