//! Session stores shared between the CLI front end and the pipeline.
//!
//! Both stores are explicitly constructed and shared by `Arc`. Reads hand
//! out snapshots, so a running export never observes a later edit.

use super::{ConnectionParameterSource, SelectionSource};
use crate::security::ConnectionParameters;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Holds the connection parameters of the current session.
#[derive(Debug, Default)]
pub struct ConnectionParametersStore {
    current: RwLock<Option<ConnectionParameters>>,
}

impl ConnectionParametersStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored parameters.
    pub fn set(&self, params: ConnectionParameters) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref() != Some(&params) {
            info!(server = %params, "Connection parameters updated");
        }
        *current = Some(params);
    }

    /// Forgets the stored parameters.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ConnectionParameterSource for ConnectionParametersStore {
    fn has_parameters(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_parameters(&self) -> Option<ConnectionParameters> {
        debug!("Connection parameters accessed");
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Insertion-ordered set of selected entity names.
#[derive(Debug, Default)]
pub struct SelectedTablesStore {
    names: RwLock<Vec<String>>,
}

impl SelectedTablesStore {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless already selected. Returns true when added.
    pub fn add(&self, name: &str) -> bool {
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        if names.iter().any(|n| n == name) {
            return false;
        }
        names.push(name.to_string());
        true
    }

    /// Removes `name`. Returns true when it was selected.
    pub fn remove(&self, name: &str) -> bool {
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        let before = names.len();
        names.retain(|n| n != name);
        names.len() != before
    }

    /// Returns true when `name` is selected.
    pub fn is_selected(&self, name: &str) -> bool {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|n| n == name)
    }

    /// Empties the selection.
    pub fn clear(&self) {
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SelectionSource for SelectedTablesStore {
    fn selected_entity_names(&self) -> Vec<String> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_store_roundtrip() {
        let store = ConnectionParametersStore::new();
        assert!(!store.has_parameters());
        assert!(store.current_parameters().is_none());

        let params = ConnectionParameters::new("srv", "erp", "sa", "pw").unwrap();
        store.set(params.clone());
        assert!(store.has_parameters());
        assert_eq!(store.current_parameters(), Some(params));

        store.clear();
        assert!(!store.has_parameters());
    }

    #[test]
    fn test_selection_keeps_insertion_order_without_duplicates() {
        let store = SelectedTablesStore::new();
        assert!(store.add("NFe"));
        assert!(store.add("Clientes"));
        assert!(!store.add("NFe"));

        assert_eq!(store.selected_entity_names(), vec!["NFe", "Clientes"]);
        assert!(store.is_selected("Clientes"));
        assert!(!store.is_selected("Produtos"));
    }

    #[test]
    fn test_selection_remove_and_clear() {
        let store = SelectedTablesStore::new();
        store.add("Clientes");
        store.add("Produtos");

        assert!(store.remove("Clientes"));
        assert!(!store.remove("Clientes"));
        assert_eq!(store.selected_entity_names(), vec!["Produtos"]);

        store.clear();
        assert!(store.selected_entity_names().is_empty());
    }

    #[test]
    fn test_selection_snapshot_is_detached() {
        let store = SelectedTablesStore::new();
        store.add("Clientes");
        let snapshot = store.selected_entity_names();
        store.add("NFe");
        assert_eq!(snapshot, vec!["Clientes"]);
    }
}
