//! Report listing and download endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use domain::models::{ListReportsQuery, ListReportsResponse};
use shared::validation::validate_report_id;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// List available reports.
///
/// GET /api/v1/reports[?group=<name>]
pub async fn list_reports(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ListReportsResponse>, ApiError> {
    query.validate()?;

    let definitions = state.reports.list(query.group.as_deref()).await?;

    tracing::debug!(
        user = %user.identity(),
        group = ?query.group,
        count = definitions.len(),
        "Listed reports"
    );

    Ok(Json(ListReportsResponse::from_definitions(&definitions)))
}

/// Generate a report and stream it as a file download.
///
/// GET /api/v1/reports/:report_id
pub async fn download_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(report_id): Path<i64>,
) -> Result<Response, ApiError> {
    validate_report_id(report_id)?;

    let started = state.reports.export(report_id, &user).await?;
    // Tracking finishes on its own once the body has been written.
    drop(started.tracking);

    Ok(started.response)
}
