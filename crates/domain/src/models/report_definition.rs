//! Report definition domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::FileExtension;

/// Base path of the report download endpoint.
pub const REPORTS_PATH: &str = "/api/v1/reports";

/// A named, storable report template.
///
/// Definitions are maintained out-of-band and never modified by an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub id: i64,
    pub name: String,
    pub query: String,
    pub file_extension: FileExtension,
    /// 1-based sheet position used when the output is a workbook.
    pub sheet_number: i32,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReportDefinition {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        query: impl Into<String>,
        file_extension: FileExtension,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            query: query.into(),
            file_extension,
            sheet_number: 1,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_sheet_number(mut self, sheet_number: i32) -> Self {
        self.sheet_number = sheet_number;
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Relative URL the report can be downloaded from.
    pub fn download_url(&self) -> String {
        format!("{}/{}", REPORTS_PATH, self.id)
    }
}

/// Public view of a report definition. Never carries the query text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: i64,
    pub name: String,
    pub file_extension: FileExtension,
    pub download_url: String,
}

impl From<&ReportDefinition> for ReportSummary {
    fn from(definition: &ReportDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name.clone(),
            file_extension: definition.file_extension,
            download_url: definition.download_url(),
        }
    }
}

/// Query parameters for listing reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    #[validate(custom(function = "shared::validation::validate_group_name"))]
    pub group: Option<String>,
}

/// Response for the report listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsResponse {
    pub data: Vec<ReportSummary>,
    pub total: usize,
}

impl ListReportsResponse {
    pub fn from_definitions(definitions: &[ReportDefinition]) -> Self {
        let data: Vec<ReportSummary> = definitions.iter().map(ReportSummary::from).collect();
        let total = data.len();
        Self { data, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportDefinition {
        ReportDefinition::new(7, "Daily Sales", "SELECT 1", FileExtension::Xlsx)
            .with_sheet_number(2)
            .with_created_by("analyst@example.com")
    }

    #[test]
    fn test_definition_builder() {
        let definition = sample();
        assert_eq!(definition.id, 7);
        assert_eq!(definition.sheet_number, 2);
        assert_eq!(definition.created_by.as_deref(), Some("analyst@example.com"));
    }

    #[test]
    fn test_download_url() {
        assert_eq!(sample().download_url(), "/api/v1/reports/7");
    }

    #[test]
    fn test_summary_hides_query() {
        let summary = ReportSummary::from(&sample());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"downloadUrl\":\"/api/v1/reports/7\""));
        assert!(json.contains("\"fileExtension\":\"xlsx\""));
        assert!(!json.contains("SELECT"));
    }

    #[test]
    fn test_list_response_total() {
        let response = ListReportsResponse::from_definitions(&[sample(), sample()]);
        assert_eq!(response.total, 2);
        assert_eq!(response.data.len(), 2);
    }

    #[test]
    fn test_list_query_validation() {
        let ok = ListReportsQuery {
            group: Some("finance".to_string()),
        };
        assert!(ok.validate().is_ok());

        let none = ListReportsQuery::default();
        assert!(none.validate().is_ok());

        let bad = ListReportsQuery {
            group: Some("drop;table".to_string()),
        };
        assert!(bad.validate().is_err());
    }
}
