//! In-memory query results.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ExportError;

/// Format used when rendering timestamps as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used when rendering dates as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    Timestamp,
    Date,
}

/// A named, typed result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Text)
    }
}

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

impl CellValue {
    /// Text rendering used by CSV output. Nulls render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Integer(v) => v.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Boolean(v) => v.to_string(),
            CellValue::Text(v) => v.clone(),
            CellValue::Timestamp(v) => v.format(TIMESTAMP_FORMAT).to_string(),
            CellValue::Date(v) => v.format(DATE_FORMAT).to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Rectangular result of a report query: ordered columns, ordered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularResult {
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl TabularResult {
    /// Build a result, rejecting rows whose width differs from the column count.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<CellValue>>) -> Result<Self, ExportError> {
        let expected = columns.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(ExportError::MalformedResult {
                row,
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
