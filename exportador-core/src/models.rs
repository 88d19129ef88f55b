//! Value objects shared by the export pipeline and its collaborators.
//!
//! Everything here is plain data. Types that are persisted (the export
//! summary) derive `Serialize`/`Deserialize`; the rest are in-memory only.

use crate::error::ExportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Percentage plus status text emitted while an export runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStatus {
    percentage: u8,
    message: String,
}

impl ExportStatus {
    /// Creates a status, clamping the percentage to 0..=100.
    pub fn new(percentage: u8, message: impl Into<String>) -> Self {
        Self {
            percentage: percentage.min(100),
            message: message.into(),
        }
    }

    /// Progress percentage, 0..=100.
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    /// Status text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of a connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTestResult {
    /// The server accepted the login and answered `SELECT 1`
    Success,
    /// The test failed; the message is never blank
    Failure { message: String },
}

impl ConnectionTestResult {
    /// Builds a failed result.
    ///
    /// Blank messages are replaced with a generic one so a failure always
    /// explains itself.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Connection test failed.".to_string()
        } else {
            message
        };
        Self::Failure { message }
    }

    /// Returns true for [`ConnectionTestResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure text, `None` on success.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { message } => Some(message),
        }
    }
}

/// A view the export relies on, with the SELECT body that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseViewDefinition {
    view_name: String,
    sql_definition: String,
}

impl DatabaseViewDefinition {
    /// Creates a view definition.
    ///
    /// # Errors
    /// Returns a configuration error when the name or the body is blank.
    pub fn new(view_name: impl Into<String>, sql_definition: impl Into<String>) -> crate::Result<Self> {
        let view_name = view_name.into();
        let sql_definition = sql_definition.into();

        if view_name.trim().is_empty() {
            return Err(ExportError::configuration("View name cannot be empty."));
        }
        if sql_definition.trim().is_empty() {
            return Err(ExportError::configuration(
                "View SQL definition cannot be empty.",
            ));
        }

        Ok(Self {
            view_name,
            sql_definition,
        })
    }

    /// Schema-qualified view name, e.g. `dbo.ClientesExportacao`.
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// SELECT statement the view is created from.
    pub fn sql_definition(&self) -> &str {
        &self.sql_definition
    }
}

/// Where a friendly entity name reads its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    /// Real table or view name, e.g. `dbo.ClientesExportacao`
    pub real_table_name: String,
    /// Comma separated select list; blank selects every column
    pub columns: String,
}

impl TableMapping {
    /// Creates a mapping.
    pub fn new(real_table_name: impl Into<String>, columns: impl Into<String>) -> Self {
        Self {
            real_table_name: real_table_name.into(),
            columns: columns.into(),
        }
    }
}

/// One result row: column names in select order with their text values.
///
/// SQL NULL is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRow {
    values: Vec<(String, Option<String>)>,
}

impl DataRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column value, keeping select order.
    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.values.push((column.into(), value));
    }

    /// Builder-style [`DataRow::push`].
    pub fn with(mut self, column: impl Into<String>, value: Option<&str>) -> Self {
        self.push(column, value.map(str::to_string));
        self
    }

    /// Column names in select order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Values in select order.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|(_, value)| value.as_deref())
    }

    /// Looks a value up by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Record count of one exported entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTableInfo {
    /// Friendly entity name
    pub table_name: String,
    /// Rows returned by the query
    pub sql_records_count: u64,
}

/// Summary of a successful export, persisted as `export_result.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResultInfo {
    /// Per-entity counts in processing order
    pub exported_tables: Vec<ExportedTableInfo>,
    /// Archive file name, "N/A" when no archive was produced
    pub zip_file_name: String,
    /// Archive size in bytes, 0 when no archive exists
    pub zip_file_size_bytes: u64,
    /// Wall-clock duration of the run
    #[serde(with = "duration_secs")]
    pub total_export_time: Duration,
    /// When the run finished
    pub completed_at: DateTime<Utc>,
}

/// Placeholder archive name for runs that produced no archive.
pub const NO_ARCHIVE: &str = "N/A";

impl ExportResultInfo {
    /// Sum of all per-entity counts.
    pub fn total_records(&self) -> u64 {
        self.exported_tables
            .iter()
            .map(|t| t.sql_records_count)
            .fold(0, u64::saturating_add)
    }

    /// Archive size in megabytes with one decimal, e.g. `"1.5 MB"`.
    pub fn zip_size_display(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let megabytes = self.zip_file_size_bytes as f64 / (1024.0 * 1024.0);
        format!("{megabytes:.1} MB")
    }

    /// Elapsed time as `"Xm Ys"`.
    pub fn elapsed_display(&self) -> String {
        let secs = self.total_export_time.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Serializes a `Duration` as fractional seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_result() -> ExportResultInfo {
        ExportResultInfo {
            exported_tables: vec![
                ExportedTableInfo {
                    table_name: "Clientes".to_string(),
                    sql_records_count: 3,
                },
                ExportedTableInfo {
                    table_name: "NFe".to_string(),
                    sql_records_count: 10,
                },
            ],
            zip_file_name: "backup.zip".to_string(),
            zip_file_size_bytes: 1_572_864,
            total_export_time: Duration::from_millis(125_500),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_status_clamps_percentage() {
        let status = ExportStatus::new(250, "done");
        assert_eq!(status.percentage(), 100);
        assert_eq!(status.message(), "done");
    }

    #[test]
    fn test_connection_test_result_failure_message() {
        let failure = ConnectionTestResult::failure("Login failed for user 'sa'.");
        assert!(!failure.is_success());
        assert_eq!(failure.error_message(), Some("Login failed for user 'sa'."));

        let blank = ConnectionTestResult::failure("  ");
        assert!(!blank.error_message().unwrap().trim().is_empty());

        assert!(ConnectionTestResult::Success.is_success());
        assert_eq!(ConnectionTestResult::Success.error_message(), None);
    }

    #[test]
    fn test_view_definition_requires_name_and_body() {
        assert!(DatabaseViewDefinition::new("dbo.V", "SELECT 1").is_ok());
        assert!(DatabaseViewDefinition::new(" ", "SELECT 1").is_err());
        assert!(DatabaseViewDefinition::new("dbo.V", "").is_err());
    }

    #[test]
    fn test_data_row_preserves_order() {
        let row = DataRow::new()
            .with("b", Some("2"))
            .with("a", None)
            .with("c", Some("3"));

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(row.values().collect::<Vec<_>>(), vec![Some("2"), None, Some("3")]);
        assert_eq!(row.get("c"), Some("3"));
        assert_eq!(row.get("a"), None);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_result_totals_and_display() {
        let result = sample_result();
        assert_eq!(result.total_records(), 13);
        assert_eq!(result.zip_size_display(), "1.5 MB");
        assert_eq!(result.elapsed_display(), "2m 5s");
    }

    #[test]
    fn test_result_json_uses_fractional_seconds() {
        let result = sample_result();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total_export_time"].as_f64(), Some(125.5));

        let back: ExportResultInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back.total_export_time, Duration::from_millis(125_500));
        assert_eq!(back.exported_tables, result.exported_tables);
    }
}
