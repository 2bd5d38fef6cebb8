//! Report tracking repository for database operations.

use async_trait::async_trait;
use domain::models::ReportTrackingRecord;
use domain::services::TrackingRecorder;
use domain::ExportError;
use sqlx::PgPool;

use crate::entities::ReportTrackingEntity;
use crate::metrics::QueryTimer;

/// Append-only store of completed exports.
#[derive(Clone)]
pub struct ReportTrackingRepository {
    pool: PgPool,
}

impl ReportTrackingRepository {
    /// Creates a new ReportTrackingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one tracking row.
    pub async fn insert(
        &self,
        record: &ReportTrackingRecord,
    ) -> Result<ReportTrackingEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_report_tracking");
        let result = sqlx::query_as::<_, ReportTrackingEntity>(
            r#"
            INSERT INTO reporting.report_tracking
                (report_id, generated_at, generated_by, output_location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, report_id, generated_at, generated_by, output_location
            "#,
        )
        .bind(record.report_id)
        .bind(record.generated_at)
        .bind(&record.generated_by)
        .bind(&record.output_location)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[async_trait]
impl TrackingRecorder for ReportTrackingRepository {
    async fn record(&self, record: &ReportTrackingRecord) -> Result<(), ExportError> {
        let entity = self
            .insert(record)
            .await
            .map_err(|e| ExportError::DatabaseReadFailure(e.to_string()))?;

        tracing::debug!(
            tracking_id = entity.id,
            report_id = entity.report_id,
            "Report tracking recorded"
        );
        Ok(())
    }
}
