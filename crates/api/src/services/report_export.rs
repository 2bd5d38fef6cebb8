//! Report export coordination.
//!
//! One export runs strictly in order: resolve the definition, execute its
//! query, encode the result, publish it to the response. Tracking is written
//! in the background once the publish has completed; it never changes what
//! the caller receives.

use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use domain::models::{output_location, ReportDefinition, ReportTrackingRecord, UserDetails};
use domain::services::{encoder, QueryExecutor, ReportDefinitionStore, TrackingRecorder};
use domain::ExportError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::middleware::metrics::{record_export_failure, record_report_exported, record_tracking_failure};
use crate::services::stream_publisher::{self, PendingPublish, PublishError};

/// A started export: the streaming response plus the background tracking task.
///
/// The task yields the record it stored, or `None` when the publish did not
/// complete or the tracking write failed.
pub struct StartedExport {
    pub response: Response,
    pub tracking: JoinHandle<Option<ReportTrackingRecord>>,
}

/// Coordinates the report pipeline collaborators.
pub struct ReportExportService {
    definitions: Arc<dyn ReportDefinitionStore>,
    executor: Arc<dyn QueryExecutor>,
    tracking: Arc<dyn TrackingRecorder>,
    output_base_url: String,
}

impl ReportExportService {
    pub fn new(
        definitions: Arc<dyn ReportDefinitionStore>,
        executor: Arc<dyn QueryExecutor>,
        tracking: Arc<dyn TrackingRecorder>,
        output_base_url: impl Into<String>,
    ) -> Self {
        Self {
            definitions,
            executor,
            tracking,
            output_base_url: output_base_url.into(),
        }
    }

    /// Available reports ordered by name, optionally limited to one group.
    pub async fn list(&self, group: Option<&str>) -> Result<Vec<ReportDefinition>, ExportError> {
        self.definitions.list(group).await
    }

    /// Look up a definition; unknown ids are `ReportIdNotFound`.
    pub async fn resolve(&self, report_id: i64) -> Result<ReportDefinition, ExportError> {
        self.definitions
            .find_by_id(report_id)
            .await?
            .ok_or(ExportError::ReportIdNotFound(report_id))
    }

    /// Export a report to `user` as a streamed download.
    pub async fn export(
        &self,
        report_id: i64,
        user: &UserDetails,
    ) -> Result<StartedExport, ExportError> {
        let started_at = Utc::now();
        info!(report_id, user = %user.identity(), "Starting report export");

        match self.run(report_id, user, started_at).await {
            Ok(started) => Ok(started),
            Err(e) => {
                record_export_failure(e.reason());
                warn!(report_id, reason = e.reason(), error = %e, "Report export failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        report_id: i64,
        user: &UserDetails,
        started_at: DateTime<Utc>,
    ) -> Result<StartedExport, ExportError> {
        let definition = self.resolve(report_id).await?;
        let result = self.executor.execute(&definition.query).await?;
        let artifact = encoder::encode(&result, &definition, started_at)?;

        let location = output_location(
            &self.output_base_url,
            definition.file_extension,
            artifact.filename(),
        );
        let format = definition.file_extension;

        let (response, pending) = stream_publisher::publish(artifact).map_err(|e| match e {
            PublishError::Response(msg) => ExportError::EncodingFailure(msg),
            PublishError::SinkClosed => {
                ExportError::EncodingFailure("response sink closed".to_string())
            }
        })?;

        info!(
            report_id,
            rows = result.row_count(),
            format = format.as_str(),
            "Report encoded, streaming"
        );

        let tracking = tokio::spawn(track_completion(
            pending,
            self.tracking.clone(),
            TrackingContext {
                report_id,
                generated_by: user.identity().to_string(),
                output_location: location,
                format,
            },
        ));

        Ok(StartedExport { response, tracking })
    }
}

struct TrackingContext {
    report_id: i64,
    generated_by: String,
    output_location: String,
    format: domain::models::FileExtension,
}

/// Wait for the publish to finish, then append the tracking record.
async fn track_completion(
    pending: PendingPublish,
    recorder: Arc<dyn TrackingRecorder>,
    context: TrackingContext,
) -> Option<ReportTrackingRecord> {
    let bytes = match pending.await {
        Ok(bytes) => bytes,
        Err(e) => {
            record_export_failure("publish");
            warn!(report_id = context.report_id, error = %e, "Report not delivered, tracking skipped");
            return None;
        }
    };

    record_report_exported(context.format, bytes);

    let record = ReportTrackingRecord::new(
        context.report_id,
        context.generated_by,
        Utc::now(),
        context.output_location,
    );

    match recorder.record(&record).await {
        Ok(()) => {
            info!(report_id = record.report_id, bytes, "Report delivered");
            Some(record)
        }
        Err(e) => {
            record_tracking_failure();
            warn!(report_id = record.report_id, error = %e, "Failed to record report tracking");
            None
        }
    }
}
