use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DirectoryError, ExportError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::ReportIdNotFound(id) => ApiError::NotFound(format!("Report {} not found", id)),
            // Driver and writer detail stays in the logs.
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::AuthUserNotFound => {
                ApiError::Unauthorized("Invalid or expired token".into())
            }
            DirectoryError::UserServiceFailure(detail) => {
                tracing::warn!(error = %detail, "User directory lookup failed");
                ApiError::Unauthorized("Unable to verify user identity".into())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field))
                })
            })
            .collect();

        let message = if messages.len() == 1 {
            messages[0].clone()
        } else {
            format!("{} validation errors", messages.len())
        };

        ApiError::Validation(message)
    }
}

impl From<validator::ValidationError> for ApiError {
    fn from(error: validator::ValidationError) -> Self {
        ApiError::Validation(
            error
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_statuses() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::NotFound("test".to_string())),
            "Not found: test"
        );
        assert_eq!(
            format!("{}", ApiError::Internal("test".to_string())),
            "Internal error: test"
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let error: ApiError =
            ExportError::DatabaseReadFailure("relation \"secret_table\" does not exist".into())
                .into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert!(!body.to_string().contains("secret_table"));
    }

    #[tokio::test]
    async fn test_report_not_found_maps_to_404() {
        let error: ApiError = ExportError::ReportIdNotFound(42).into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Report 42 not found");
    }

    #[test]
    fn test_encoding_and_configuration_errors_are_internal() {
        let encoding: ApiError = ExportError::EncodingFailure("too many rows".into()).into();
        assert!(matches!(encoding, ApiError::Internal(_)));

        let config: ApiError = ExportError::InvalidConfiguration("pdf".into()).into();
        assert!(matches!(config, ApiError::Internal(_)));
    }

    #[test]
    fn test_directory_errors_are_unauthorized() {
        let not_found: ApiError = DirectoryError::AuthUserNotFound.into();
        assert!(matches!(not_found, ApiError::Unauthorized(_)));

        let failure: ApiError = DirectoryError::UserServiceFailure("timeout".into()).into();
        match failure {
            ApiError::Unauthorized(msg) => assert!(!msg.contains("timeout")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_error_message() {
        let mut error = validator::ValidationError::new("group_name");
        error.message = Some("Group name contains invalid characters".into());

        match ApiError::from(error) {
            ApiError::Validation(msg) => assert_eq!(msg, "Group name contains invalid characters"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
