//! Terminal output for export progress and summaries.

use exportador_core::ExportResultInfo;
use exportador_core::pipeline::ExportObserver;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

/// Prints every status message with the latest percentage to stderr.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    quiet: bool,
    percentage: AtomicU8,
}

impl ConsoleObserver {
    /// Creates an observer; `quiet` silences it entirely.
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            percentage: AtomicU8::new(0),
        }
    }
}

impl ExportObserver for ConsoleObserver {
    fn on_progress(&self, percentage: u8) {
        self.percentage.store(percentage, Ordering::Relaxed);
    }

    fn on_status_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        // Messages arrive before their percentage, so show the previous one.
        let percentage = self.percentage.load(Ordering::Relaxed);
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "[{percentage:>3}%] {message}");
    }
}

/// Renders an export summary as plain text lines.
pub fn render_summary(result: &ExportResultInfo) -> String {
    let mut lines = vec![
        format!("Archive:   {}", result.zip_file_name),
        format!("Size:      {}", result.zip_size_display()),
        format!("Duration:  {}", result.elapsed_display()),
        format!(
            "Finished:  {}",
            result.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!("Records:   {}", result.total_records()),
    ];

    if !result.exported_tables.is_empty() {
        lines.push("Tables:".to_string());
        let width = result
            .exported_tables
            .iter()
            .map(|t| t.table_name.len())
            .max()
            .unwrap_or(0);
        for table in &result.exported_tables {
            lines.push(format!(
                "  {:<width$}  {}",
                table.table_name, table.sql_records_count
            ));
        }
    }

    lines.join("\n")
}
