//! Conversion of SQL Server cell values to CSV text.
//!
//! Numbers use their plain decimal form, booleans `True`/`False`, GUIDs and
//! binary upper-case, temporal types ISO-8601. NULL maps to `None`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{ColumnData, FromSql, Row};

use crate::models::DataRow;

/// Renders one cell, `None` for SQL NULL.
pub fn cell_to_text(data: &ColumnData<'static>) -> Option<String> {
    match data {
        ColumnData::U8(v) => v.map(|v| v.to_string()),
        ColumnData::I16(v) => v.map(|v| v.to_string()),
        ColumnData::I32(v) => v.map(|v| v.to_string()),
        ColumnData::I64(v) => v.map(|v| v.to_string()),
        ColumnData::F32(v) => v.map(|v| v.to_string()),
        ColumnData::F64(v) => v.map(|v| v.to_string()),
        ColumnData::Bit(v) => v.map(|v| if v { "True" } else { "False" }.to_string()),
        ColumnData::String(v) => v.as_ref().map(|s| s.to_string()),
        ColumnData::Guid(v) => v.map(|g| g.to_string().to_uppercase()),
        ColumnData::Numeric(v) => v.map(|n| n.to_string()),
        ColumnData::Binary(v) => v.as_ref().map(hex::encode_upper),
        ColumnData::Xml(v) => v.as_ref().map(|xml| xml.clone().into_owned().into_string()),
        temporal => temporal_to_text(temporal),
    }
}

fn temporal_to_text(data: &ColumnData<'static>) -> Option<String> {
    if let Ok(value) = NaiveDateTime::from_sql(data) {
        return value.map(|v| v.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(value) = NaiveDate::from_sql(data) {
        return value.map(|v| v.format("%Y-%m-%d").to_string());
    }
    if let Ok(value) = NaiveTime::from_sql(data) {
        return value.map(|v| v.format("%H:%M:%S%.f").to_string());
    }
    if let Ok(value) = DateTime::<FixedOffset>::from_sql(data) {
        return value.map(|v| v.to_rfc3339());
    }
    None
}

/// Converts a driver row into a [`DataRow`], keeping column order.
pub fn row_to_data_row(row: &Row) -> DataRow {
    let mut out = DataRow::new();
    for (column, data) in row.cells() {
        out.push(column.name(), cell_to_text(data));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_numbers_and_bits() {
        assert_eq!(cell_to_text(&ColumnData::I32(Some(42))), Some("42".to_string()));
        assert_eq!(cell_to_text(&ColumnData::I64(Some(-7))), Some("-7".to_string()));
        assert_eq!(cell_to_text(&ColumnData::F64(Some(1.5))), Some("1.5".to_string()));
        assert_eq!(cell_to_text(&ColumnData::Bit(Some(true))), Some("True".to_string()));
        assert_eq!(cell_to_text(&ColumnData::Bit(Some(false))), Some("False".to_string()));
    }

    #[test]
    fn test_nulls() {
        assert_eq!(cell_to_text(&ColumnData::I32(None)), None);
        assert_eq!(cell_to_text(&ColumnData::String(None)), None);
        assert_eq!(cell_to_text(&ColumnData::Binary(None)), None);
    }

    #[test]
    fn test_strings_and_binary() {
        assert_eq!(
            cell_to_text(&ColumnData::String(Some(Cow::Borrowed("São Paulo")))),
            Some("São Paulo".to_string())
        );
        assert_eq!(
            cell_to_text(&ColumnData::Binary(Some(Cow::Owned(vec![0x0a, 0xff, 0x00])))),
            Some("0AFF00".to_string())
        );
    }

    #[test]
    fn test_empty_binary_is_empty_text() {
        assert_eq!(
            cell_to_text(&ColumnData::Binary(Some(Cow::Owned(Vec::new())))),
            Some(String::new())
        );
    }
}
