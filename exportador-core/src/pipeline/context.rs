//! Mutable state threaded through one export run.

use super::progress::ProgressReporter;
use crate::models::ExportStatus;
use crate::security::ConnectionParameters;
use std::path::PathBuf;
use std::sync::Arc;

/// Per-entity row counts with case-insensitive keys.
///
/// Keeps insertion order. Inserting a name that differs from an existing
/// key only by case replaces that entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRecordCounts {
    entries: Vec<(String, u64)>,
}

impl TableRecordCounts {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let needle = name.to_lowercase();
        self.entries
            .iter()
            .position(|(key, _)| key.to_lowercase() == needle)
    }

    /// Sets the count for `name`.
    pub fn insert(&mut self, name: &str, count: u64) {
        match self.position(name) {
            Some(index) => {
                if let Some(entry) = self.entries.get_mut(index) {
                    *entry = (name.to_string(), count);
                }
            }
            None => self.entries.push((name.to_string(), count)),
        }
    }

    /// Count for `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.position(name)
            .and_then(|index| self.entries.get(index))
            .map(|(_, count)| *count)
    }

    /// Removes `name`, returning its count.
    pub fn remove(&mut self, name: &str) -> Option<u64> {
        self.position(name)
            .map(|index| self.entries.remove(index).1)
    }

    /// Returns true when `name` has a count.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// `(name, count)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no count was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// State owned by a single export run.
///
/// Fields are filled by the steps in pipeline order; a step only reads
/// what an earlier step populated.
pub struct ExportContext {
    progress_reporter: Arc<dyn ProgressReporter>,
    /// Copied from the parameter source by the validation step
    pub connection_parameters: Option<ConnectionParameters>,
    /// Entity names to export, in selection order
    pub selected_friendly_table_names: Vec<String>,
    /// CSV files written so far; emptied by cleanup
    pub temporary_csv_file_paths: Vec<PathBuf>,
    /// Archive path, set by the archive step
    pub final_zip_file_path: Option<PathBuf>,
    /// Rows read per entity
    pub sql_records_count_per_table: TableRecordCounts,
}

impl ExportContext {
    /// Creates an empty context reporting to `progress_reporter`.
    pub fn new(progress_reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            progress_reporter,
            connection_parameters: None,
            selected_friendly_table_names: Vec::new(),
            temporary_csv_file_paths: Vec::new(),
            final_zip_file_path: None,
            sql_records_count_per_table: TableRecordCounts::new(),
        }
    }

    /// Reporter shared by every step of this run.
    pub fn progress_reporter(&self) -> &Arc<dyn ProgressReporter> {
        &self.progress_reporter
    }

    /// Shorthand for reporting a status through the context's reporter.
    pub fn report(&self, percentage: u8, message: impl Into<String>) {
        self.progress_reporter
            .report(ExportStatus::new(percentage, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::{NullObserver, ObserverProgressReporter};

    #[test]
    fn test_counts_case_insensitive_replace() {
        let mut counts = TableRecordCounts::new();
        counts.insert("Clientes", 3);
        counts.insert("NFe", 10);
        counts.insert("CLIENTES", 5);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("clientes"), Some(5));
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![("CLIENTES", 5), ("NFe", 10)]
        );
    }

    #[test]
    fn test_counts_remove() {
        let mut counts = TableRecordCounts::new();
        counts.insert("Notas", 2);
        assert!(counts.contains("notas"));
        assert_eq!(counts.remove("NOTAS"), Some(2));
        assert!(counts.is_empty());
        assert_eq!(counts.remove("Notas"), None);
    }

    #[test]
    fn test_context_starts_empty() {
        let reporter = Arc::new(ObserverProgressReporter::new(Arc::new(NullObserver)));
        let context = ExportContext::new(reporter);

        assert!(context.connection_parameters.is_none());
        assert!(context.selected_friendly_table_names.is_empty());
        assert!(context.temporary_csv_file_paths.is_empty());
        assert!(context.final_zip_file_path.is_none());
        assert!(context.sql_records_count_per_table.is_empty());

        context.report(42, "halfway");
        assert_eq!(context.progress_reporter().last_percentage(), 42);
    }
}
