//! Provisioning of the export views.

use super::{DatabaseSetup, SchemaManagement, ViewDefinitionProvider};
use crate::error::ExportError;
use crate::models::DatabaseViewDefinition;
use crate::security::ConnectionParameters;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Recreates every required view, then refreshes its metadata.
///
/// Stops at the first failing view. Views recreated before the failure are
/// left in place.
pub struct DatabaseSetupService {
    schema: Arc<dyn SchemaManagement>,
    required_views: Vec<DatabaseViewDefinition>,
    settle_delay: Duration,
}

impl DatabaseSetupService {
    /// Captures the required views once, at construction.
    pub fn new(
        schema: Arc<dyn SchemaManagement>,
        views: &dyn ViewDefinitionProvider,
        settle_delay: Duration,
    ) -> Self {
        Self {
            schema,
            required_views: views.required_views(),
            settle_delay,
        }
    }

    async fn setup_view(
        &self,
        params: &ConnectionParameters,
        view: &DatabaseViewDefinition,
    ) -> crate::Result<()> {
        debug!(view = view.view_name(), "Creating view");
        self.schema.create_or_alter_view(params, view).await?;
        info!(view = view.view_name(), "View configured");

        let refresh = format!(
            "EXEC sp_refreshview '{}'",
            view.view_name().replace('\'', "''")
        );
        self.schema.execute_sql_command(params, &refresh).await?;
        debug!(view = view.view_name(), "sp_refreshview executed");
        Ok(())
    }
}

#[async_trait]
impl DatabaseSetup for DatabaseSetupService {
    async fn setup_required_views(&self, params: &ConnectionParameters) -> crate::Result<()> {
        info!(
            count = self.required_views.len(),
            "Configuring required export views"
        );

        for view in &self.required_views {
            if let Err(e) = self.setup_view(params, view).await {
                error!(view = view.view_name(), "Failed to configure view: {e}");
                return Err(ExportError::schema_setup(format!(
                    "Database error while configuring view '{}': {e}",
                    view.view_name()
                )));
            }
        }

        info!("All required views configured");
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(())
    }
}
