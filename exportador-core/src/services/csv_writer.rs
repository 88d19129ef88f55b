//! Semicolon-delimited CSV output.
//!
//! Format: header from the first row's column names, `;` separator, CRLF
//! record terminator, UTF-8 without BOM. Fields holding `;`, `"`, CR or LF
//! are quoted with embedded quotes doubled; NULL becomes an empty field.

use super::CsvWriter;
use crate::error::ExportError;
use crate::models::DataRow;
use async_trait::async_trait;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::io::Write as _;
use std::path::Path;
use tracing::{debug, info, warn};

/// CSV writer using the semicolon dialect expected by spreadsheet imports.
#[derive(Debug, Default, Clone, Copy)]
pub struct SemicolonCsvWriter;

impl SemicolonCsvWriter {
    /// Creates the writer.
    pub fn new() -> Self {
        Self
    }
}

fn encoding_error(e: impl Into<std::io::Error>) -> ExportError {
    ExportError::io("Failed to encode CSV records", e.into())
}

/// Writes one record; a lone empty field becomes a bare line break.
fn write_fields(wtr: &mut Writer<Vec<u8>>, fields: &[&str]) -> crate::Result<()> {
    if let [only] = fields
        && only.is_empty()
    {
        // The encoder quotes this case as `""`, which would read back as a value.
        wtr.flush().map_err(encoding_error)?;
        return wtr.get_mut().write_all(b"\r\n").map_err(encoding_error);
    }
    wtr.write_record(fields).map_err(encoding_error)
}

/// Renders `rows` as CSV text; an empty slice yields an empty string.
///
/// Columns are taken from the first row. A later row missing one of them
/// gets an empty field there.
///
/// # Errors
/// Fails only when the encoder rejects a record.
pub fn render_csv(rows: &[DataRow]) -> crate::Result<String> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let headers: Vec<&str> = first.columns().collect();

    let mut wtr = WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    write_fields(&mut wtr, &headers)?;
    for row in rows {
        let fields: Vec<&str> = headers.iter().map(|h| row.get(h).unwrap_or_default()).collect();
        write_fields(&mut wtr, &fields)?;
    }

    let bytes = wtr.into_inner().map_err(|e| encoding_error(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| encoding_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[async_trait]
impl CsvWriter for SemicolonCsvWriter {
    async fn write_csv(&self, path: &Path, rows: &[DataRow]) -> crate::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ExportError::io(
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
            debug!(dir = %parent.display(), "Created directory for CSV file");
        }

        if rows.is_empty() {
            warn!(path = %path.display(), "No rows to write, creating empty CSV file");
        }

        tokio::fs::write(path, render_csv(rows)?).await.map_err(|e| {
            ExportError::io(format!("Failed to write CSV file '{}'", path.display()), e)
        })?;

        info!(path = %path.display(), rows = rows.len(), "CSV file written");
        Ok(())
    }
}
