//! Operations around the export that the front end drives directly.
//!
//! Connection testing stores parameters that later feed the export, table
//! discovery lists what the database offers, and the selection manager
//! edits the entity set the export reads.

use crate::error::ExportError;
use crate::models::ConnectionTestResult;
use crate::pipeline::steps::MISSING_PARAMETERS_MESSAGE;
use crate::security::ConnectionParameters;
use crate::services::{
    ConnectionParameterSource, ConnectionParametersStore, ConnectionTester, SelectedTablesStore,
    SelectionSource, TableDiscovery,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Validates raw connection input and proves it against the server.
pub struct TestDatabaseConnection {
    tester: Arc<dyn ConnectionTester>,
    store: Arc<ConnectionParametersStore>,
}

impl TestDatabaseConnection {
    /// Creates the operation; successful parameters are saved in `store`.
    pub fn new(tester: Arc<dyn ConnectionTester>, store: Arc<ConnectionParametersStore>) -> Self {
        Self { tester, store }
    }

    /// Tests the connection described by the raw inputs.
    ///
    /// Invalid input and connection errors both come back as a failed
    /// result carrying the message to show. The store is only updated on
    /// success.
    pub async fn execute(
        &self,
        server: &str,
        database: &str,
        user: &str,
        password: &str,
    ) -> ConnectionTestResult {
        let params = match ConnectionParameters::new(server, database, user, password) {
            Ok(params) => params,
            Err(e) => {
                warn!("Rejected connection input: {e}");
                return ConnectionTestResult::failure(e.to_string());
            }
        };

        match self.tester.test_connection(&params).await {
            Ok(()) => {
                info!(server = %params, "Connection test succeeded");
                self.store.set(params);
                ConnectionTestResult::Success
            }
            Err(e) => {
                warn!(server = %params, "Connection test failed: {e}");
                ConnectionTestResult::failure(e.to_string())
            }
        }
    }
}

/// Lists the base tables of the connected database.
pub struct GetTableNames {
    source: Arc<dyn ConnectionParameterSource>,
    discovery: Arc<dyn TableDiscovery>,
}

impl GetTableNames {
    /// Creates the operation over the stored parameters.
    pub fn new(source: Arc<dyn ConnectionParameterSource>, discovery: Arc<dyn TableDiscovery>) -> Self {
        Self { source, discovery }
    }

    /// `schema.table` names matching `like_pattern`; blank means all.
    ///
    /// # Errors
    /// Fails when no parameters were stored or the query fails.
    pub async fn execute(&self, like_pattern: &str) -> crate::Result<Vec<String>> {
        let params = self
            .source
            .current_parameters()
            .ok_or_else(|| ExportError::configuration(MISSING_PARAMETERS_MESSAGE))?;

        let pattern = if like_pattern.trim().is_empty() {
            "%"
        } else {
            like_pattern
        };
        self.discovery.get_table_names(&params, pattern).await
    }
}

/// Edits the set of entities the next export reads.
pub struct ManageSelectedTables {
    store: Arc<SelectedTablesStore>,
}

impl ManageSelectedTables {
    /// Creates the manager over a selection store.
    pub fn new(store: Arc<SelectedTablesStore>) -> Self {
        Self { store }
    }

    fn require_name(name: &str) -> crate::Result<&str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExportError::configuration("Table name cannot be empty."));
        }
        Ok(name)
    }

    /// Selects `name`; returns false when it was already selected.
    ///
    /// # Errors
    /// Rejects a blank name.
    pub fn add(&self, name: &str) -> crate::Result<bool> {
        Ok(self.store.add(Self::require_name(name)?))
    }

    /// Deselects `name`; returns false when it was not selected.
    ///
    /// # Errors
    /// Rejects a blank name.
    pub fn remove(&self, name: &str) -> crate::Result<bool> {
        Ok(self.store.remove(Self::require_name(name)?))
    }

    /// Selected names in selection order.
    pub fn list(&self) -> Vec<String> {
        self.store.selected_entity_names()
    }

    /// Returns true when `name` is selected.
    pub fn is_selected(&self, name: &str) -> bool {
        self.store.is_selected(name.trim())
    }

    /// Deselects everything.
    pub fn clear(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeServer {
        reachable: bool,
        patterns: Mutex<Vec<String>>,
    }

    impl FakeServer {
        fn new(reachable: bool) -> Arc<Self> {
            Arc::new(Self {
                reachable,
                patterns: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ConnectionTester for FakeServer {
        async fn test_connection(&self, params: &ConnectionParameters) -> crate::Result<()> {
            if self.reachable {
                Ok(())
            } else {
                Err(ExportError::connection_failed(
                    format!("Unable to reach {params}"),
                    std::io::Error::other("connection refused"),
                ))
            }
        }
    }

    #[async_trait]
    impl TableDiscovery for FakeServer {
        async fn get_table_names(
            &self,
            _params: &ConnectionParameters,
            like_pattern: &str,
        ) -> crate::Result<Vec<String>> {
            self.patterns.lock().unwrap().push(like_pattern.to_string());
            Ok(vec!["dbo.Clientes".to_string(), "dbo.Produtos".to_string()])
        }
    }

    #[tokio::test]
    async fn test_connection_success_stores_parameters() {
        let store = Arc::new(ConnectionParametersStore::new());
        let op = TestDatabaseConnection::new(FakeServer::new(true), store.clone());

        let result = op.execute("srv", "erp", "sa", "pw").await;

        assert!(result.is_success());
        assert_eq!(store.current_parameters().unwrap().server(), "srv");
    }

    #[tokio::test]
    async fn test_connection_invalid_input_is_failure() {
        let store = Arc::new(ConnectionParametersStore::new());
        let op = TestDatabaseConnection::new(FakeServer::new(true), store.clone());

        let result = op.execute("srv", "  ", "sa", "pw").await;

        assert_eq!(result.error_message(), Some("Database name cannot be empty."));
        assert!(!store.has_parameters());
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_store_empty() {
        let store = Arc::new(ConnectionParametersStore::new());
        let op = TestDatabaseConnection::new(FakeServer::new(false), store.clone());

        let result = op.execute("srv", "erp", "sa", "secret-pw").await;

        let message = result.error_message().unwrap();
        assert!(message.contains("Unable to reach"));
        assert!(!message.contains("secret-pw"));
        assert!(!store.has_parameters());
    }

    #[tokio::test]
    async fn test_table_names_require_parameters() {
        let op = GetTableNames::new(Arc::new(ConnectionParametersStore::new()), FakeServer::new(true));
        let err = op.execute("%").await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_PARAMETERS_MESSAGE);
    }

    #[tokio::test]
    async fn test_table_names_blank_pattern_matches_all() {
        let store = Arc::new(ConnectionParametersStore::new());
        store.set(ConnectionParameters::new("srv", "erp", "sa", "pw").unwrap());
        let server = FakeServer::new(true);
        let op = GetTableNames::new(store, server.clone());

        let names = op.execute(" ").await.unwrap();

        assert_eq!(names, vec!["dbo.Clientes", "dbo.Produtos"]);
        assert_eq!(*server.patterns.lock().unwrap(), vec!["%"]);
    }

    #[test]
    fn test_selection_management() {
        let manager = ManageSelectedTables::new(Arc::new(SelectedTablesStore::new()));

        assert!(manager.add("Clientes").unwrap());
        assert!(!manager.add("Clientes").unwrap());
        assert!(manager.add(" NFe ").unwrap());
        assert_eq!(manager.list(), vec!["Clientes", "NFe"]);
        assert!(manager.is_selected("NFe"));

        assert!(manager.remove("Clientes").unwrap());
        assert!(!manager.remove("Clientes").unwrap());

        let err = manager.add("   ").unwrap_err();
        assert_eq!(err.to_string(), "Table name cannot be empty.");

        manager.clear();
        assert!(manager.list().is_empty());
    }
}
