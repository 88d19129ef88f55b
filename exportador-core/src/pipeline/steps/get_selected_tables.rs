use crate::error::ExportError;
use crate::pipeline::{ExportContext, ExportStep};
use crate::services::SelectionSource;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Copies the operator's entity selection into the context.
pub struct GetSelectedTablesStep {
    selection: Arc<dyn SelectionSource>,
}

impl GetSelectedTablesStep {
    /// Creates the step over a selection source.
    pub fn new(selection: Arc<dyn SelectionSource>) -> Self {
        Self { selection }
    }
}

#[async_trait]
impl ExportStep for GetSelectedTablesStep {
    fn name(&self) -> &'static str {
        "get-selected-tables"
    }

    async fn execute(&self, context: &mut ExportContext) -> crate::Result<()> {
        context.report(10, "Fetching selected tables...");

        let names = self.selection.selected_entity_names();
        if names.is_empty() {
            warn!("No entity selected for export");
            return Err(ExportError::configuration("No table selected for export."));
        }

        info!(count = names.len(), tables = ?names, "Selected tables loaded");
        context.selected_friendly_table_names = names;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::steps::test_support::recording_context;
    use crate::services::SelectedTablesStore;

    #[tokio::test]
    async fn test_empty_selection_is_hard_stop() {
        let step = GetSelectedTablesStep::new(Arc::new(SelectedTablesStore::new()));
        let (mut context, _) = recording_context();

        let err = step.execute(&mut context).await.unwrap_err();
        assert_eq!(err.to_string(), "No table selected for export.");
    }

    #[tokio::test]
    async fn test_names_copied_in_store_order() {
        let store = Arc::new(SelectedTablesStore::new());
        store.add("NFe");
        store.add("Clientes");
        let step = GetSelectedTablesStep::new(store);
        let (mut context, observer) = recording_context();

        step.execute(&mut context).await.unwrap();

        assert_eq!(context.selected_friendly_table_names, vec!["NFe", "Clientes"]);
        assert_eq!(observer.percentages(), vec![10]);
    }
}
