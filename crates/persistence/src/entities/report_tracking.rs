//! Report tracking entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for `reporting.report_tracking`.
#[derive(Debug, Clone, FromRow)]
pub struct ReportTrackingEntity {
    pub id: i64,
    pub report_id: i64,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
    pub output_location: String,
}
