//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors so
//! they render consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stratus_core::{AppError, ErrorMetadata, LogLevel};
use stratus_storage::StorageError;
use utoipa::ToSchema;

/// Error body shape shared by every failing operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false; mirrors the `success` flag of the happy-path bodies.
    pub success: bool,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Needed because of the orphan rule: IntoResponse is external and
/// AppError lives in stratus-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            success: false,
            error: app_error.client_message(),
            code: app_error.error_code().to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = ErrorResponse {
            success: false,
            error: "File not found".to_string(),
            code: "NOT_FOUND".to_string(),
            details: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("success"), Some(&serde_json::Value::Bool(false)));
        assert_eq!(
            json.get("error").and_then(|v| v.as_str()),
            Some("File not found")
        );
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_storage_error_maps_through_app_error() {
        let HttpAppError(app) = StorageError::NotFound("abc".to_string()).into();
        assert!(matches!(app, AppError::NotFound(_)));

        let HttpAppError(app) = StorageError::SessionRejected {
            status: 403,
            body: "quota exceeded".to_string(),
        }
        .into();
        match app {
            AppError::Provider(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("expected Provider, got {:?}", other),
        }
    }
}
