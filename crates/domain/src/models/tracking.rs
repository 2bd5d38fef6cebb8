//! Report tracking records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FileExtension;

/// Audit entry for one completed export. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTrackingRecord {
    pub report_id: i64,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
    pub output_location: String,
}

impl ReportTrackingRecord {
    pub fn new(
        report_id: i64,
        generated_by: impl Into<String>,
        generated_at: DateTime<Utc>,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            report_id,
            generated_at,
            generated_by: generated_by.into(),
            output_location: output_location.into(),
        }
    }
}

/// Build the output location recorded for a generated file:
/// `{base}/{sub_path}/{filename}`.
pub fn output_location(base: &str, file_extension: FileExtension, filename: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        format!("{}/{}", file_extension.sub_path(), filename)
    } else {
        format!("{}/{}/{}", base, file_extension.sub_path(), filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_location() {
        assert_eq!(
            output_location("https://files.example.com/reports/", FileExtension::Xlsx, "a.xlsx"),
            "https://files.example.com/reports/excel/a.xlsx"
        );
        assert_eq!(
            output_location("/srv/reports", FileExtension::Csv, "a.csv"),
            "/srv/reports/csv/a.csv"
        );
        assert_eq!(output_location("", FileExtension::Csv, "a.csv"), "csv/a.csv");
    }

    #[test]
    fn test_tracking_record_serialization() {
        let now = Utc::now();
        let record = ReportTrackingRecord::new(3, "jane@example.com", now, "csv/a.csv");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"reportId\":3"));
        assert!(json.contains("\"generatedBy\":\"jane@example.com\""));
    }
}
