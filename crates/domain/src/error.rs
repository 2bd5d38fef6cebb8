//! Domain error types.

use thiserror::Error;

use crate::models::UnknownFileExtension;

/// Failures of the report export pipeline.
///
/// Messages may contain driver or writer detail; the HTTP layer decides how
/// much of it reaches the caller.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Report {0} not found")]
    ReportIdNotFound(i64),

    #[error("Database read failed: {0}")]
    DatabaseReadFailure(String),

    #[error("Encoding failed: {0}")]
    EncodingFailure(String),

    #[error("Invalid report configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Malformed query result: row {row} has {actual} values, expected {expected}")]
    MalformedResult {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl ExportError {
    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            ExportError::ReportIdNotFound(_) => "not_found",
            ExportError::DatabaseReadFailure(_) => "database",
            ExportError::EncodingFailure(_) => "encoding",
            ExportError::InvalidConfiguration(_) => "configuration",
            ExportError::MalformedResult { .. } => "malformed_result",
        }
    }
}

impl From<UnknownFileExtension> for ExportError {
    fn from(err: UnknownFileExtension) -> Self {
        ExportError::InvalidConfiguration(err.to_string())
    }
}

/// Failures while resolving the caller against the identity directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("User not found in directory")]
    AuthUserNotFound,

    #[error("User directory unavailable: {0}")]
    UserServiceFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_display() {
        assert_eq!(
            ExportError::ReportIdNotFound(42).to_string(),
            "Report 42 not found"
        );
        assert_eq!(
            ExportError::MalformedResult {
                row: 3,
                expected: 2,
                actual: 1
            }
            .to_string(),
            "Malformed query result: row 3 has 1 values, expected 2"
        );
    }

    #[test]
    fn test_unknown_extension_becomes_configuration_error() {
        let err: ExportError = UnknownFileExtension("pdf".to_string()).into();
        match &err {
            ExportError::InvalidConfiguration(msg) => assert!(msg.contains("pdf")),
            other => panic!("Expected InvalidConfiguration, got {:?}", other),
        }
        assert_eq!(err.reason(), "configuration");
    }

    #[test]
    fn test_reasons_are_distinct() {
        let reasons = [
            ExportError::ReportIdNotFound(1).reason(),
            ExportError::DatabaseReadFailure(String::new()).reason(),
            ExportError::EncodingFailure(String::new()).reason(),
            ExportError::InvalidConfiguration(String::new()).reason(),
            ExportError::MalformedResult {
                row: 0,
                expected: 0,
                actual: 0,
            }
            .reason(),
        ];
        let unique: std::collections::HashSet<_> = reasons.iter().collect();
        assert_eq!(unique.len(), reasons.len());
    }

    #[test]
    fn test_directory_error_display() {
        assert_eq!(
            DirectoryError::AuthUserNotFound.to_string(),
            "User not found in directory"
        );
        assert_eq!(
            DirectoryError::UserServiceFailure("timeout".to_string()).to_string(),
            "User directory unavailable: timeout"
        );
    }
}
