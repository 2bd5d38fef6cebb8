//! Report output format registry.
//!
//! The set of output formats is closed. Each format knows its file
//! extension, the output sub-path generated files are filed under and the
//! MIME type sent to clients.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// MIME type for Office Open XML spreadsheets.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type for CSV output.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Output format declared on a report definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileExtension {
    Csv,
    Xlsx,
}

/// Raised when a stored or requested extension is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid report file extension '{0}' (expected one of: csv, xlsx)")]
pub struct UnknownFileExtension(pub String);

impl FileExtension {
    /// Every registered format.
    pub const ALL: [FileExtension; 2] = [FileExtension::Csv, FileExtension::Xlsx];

    /// Extension without the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExtension::Csv => "csv",
            FileExtension::Xlsx => "xlsx",
        }
    }

    /// Output sub-path generated files of this format are filed under.
    pub fn sub_path(&self) -> &'static str {
        match self {
            FileExtension::Csv => "csv",
            FileExtension::Xlsx => "excel",
        }
    }

    /// Content type sent with the artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            FileExtension::Csv => CSV_CONTENT_TYPE,
            FileExtension::Xlsx => XLSX_CONTENT_TYPE,
        }
    }
}

impl FromStr for FileExtension {
    type Err = UnknownFileExtension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "csv" => Ok(FileExtension::Csv),
            "xlsx" => Ok(FileExtension::Xlsx),
            _ => Err(UnknownFileExtension(s.to_string())),
        }
    }
}

impl std::fmt::Display for FileExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
