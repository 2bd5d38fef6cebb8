//! Report definition entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{FileExtension, ReportDefinition};
use domain::ExportError;
use sqlx::FromRow;

/// Database row mapping for `reporting.report_definitions`.
#[derive(Debug, Clone, FromRow)]
pub struct ReportDefinitionEntity {
    pub id: i64,
    pub report_name: String,
    pub query: String,
    pub file_extension: String,
    pub sheet_number: i32,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReportDefinitionEntity {
    /// Convert to domain model.
    ///
    /// The stored extension is parsed, never defaulted; an unknown value makes
    /// the definition unusable.
    pub fn into_domain(self) -> Result<ReportDefinition, ExportError> {
        let file_extension = self.file_extension.parse::<FileExtension>()?;

        Ok(ReportDefinition {
            id: self.id,
            name: self.report_name,
            query: self.query,
            file_extension,
            sheet_number: self.sheet_number,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<ReportDefinitionEntity> for ReportDefinition {
    type Error = ExportError;

    fn try_from(entity: ReportDefinitionEntity) -> Result<Self, Self::Error> {
        entity.into_domain()
    }
}
