//! HTTP error response conversion
//!
//! Domain errors (validation, storage, relay) convert into `AppError` here
//! and render as `{ "error": string }` JSON with the status code the error's
//! metadata dictates. The `HttpAppError` wrapper exists because of Rust's
//! orphan rules: `IntoResponse` cannot be implemented for `AppError`
//! directly in uplink-core.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uplink_core::{AppError, ErrorMetadata, LogLevel, ValidationError};
use uplink_relay::RelayError;
use uplink_storage::StorageError;

/// The error body shape of every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper type for AppError to implement IntoResponse.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
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

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        // Validation messages already name the offending field and constraint.
        HttpAppError(AppError::InvalidInput(err.to_string()))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            // A malformed key is indistinguishable from a never-issued one
            // to the caller.
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
                AppError::NotFound("Object not found".to_string())
            }
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<RelayError> for HttpAppError {
    fn from(err: RelayError) -> Self {
        let app = match &err {
            RelayError::NotConfigured => AppError::WebhookNotConfigured,
            RelayError::UpstreamRejected { status, .. } => AppError::WebhookRejected {
                status: *status,
                message: err.upstream_message().unwrap_or_default(),
            },
            RelayError::Unreachable(detail) => AppError::WebhookUnreachable(detail.clone()),
            RelayError::Payload(detail) => AppError::Internal(detail.clone()),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error.detailed_message(), error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error.detailed_message(), error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Request failed");
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
            error: app_error.client_message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplink_core::constants::{NO_FILES_MESSAGE, WEBHOOK_NOT_CONFIGURED_MESSAGE};

    #[test]
    fn test_error_body_has_only_error_field() {
        let response = ErrorResponse {
            error: NO_FILES_MESSAGE.to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "At least one file (photo or video) is required" })
        );
    }

    #[test]
    fn test_from_validation_error_is_bad_request() {
        let err = uplink_core::validate(
            uplink_core::FileCategory::Photo,
            "text/plain",
            16,
        )
        .unwrap_err();
        let HttpAppError(app) = err.into();
        assert_eq!(app.http_status_code(), 400);
        assert!(app.client_message().contains("photo"));
    }

    #[test]
    fn test_from_storage_not_found() {
        let HttpAppError(app) = StorageError::NotFound("a.png".to_string()).into();
        assert_eq!(app.http_status_code(), 404);
        assert_eq!(app.client_message(), "Object not found");
    }

    #[test]
    fn test_from_storage_invalid_key_is_not_found() {
        let HttpAppError(app) = StorageError::InvalidKey("../etc".to_string()).into();
        assert_eq!(app.http_status_code(), 404);
    }

    #[test]
    fn test_from_storage_write_failure_is_internal() {
        let HttpAppError(app) = StorageError::UploadFailed("disk full".to_string()).into();
        assert_eq!(app.http_status_code(), 500);
        assert_eq!(app.client_message(), "Failed to upload files");
    }

    #[test]
    fn test_from_relay_not_configured() {
        let HttpAppError(app) = RelayError::NotConfigured.into();
        assert_eq!(app.http_status_code(), 500);
        assert_eq!(app.client_message(), WEBHOOK_NOT_CONFIGURED_MESSAGE);
    }

    #[test]
    fn test_from_relay_upstream_rejection_mirrors_status() {
        let err = RelayError::UpstreamRejected {
            status: 422,
            body: r#"{"message":"missing field"}"#.to_string(),
        };
        let HttpAppError(app) = err.into();
        assert_eq!(app.http_status_code(), 422);
        assert_eq!(app.client_message(), "Webhook error: missing field");
    }

    #[test]
    fn test_from_relay_unreachable_is_bad_gateway() {
        let HttpAppError(app) = RelayError::Unreachable("connection refused".to_string()).into();
        assert_eq!(app.http_status_code(), 502);
        assert!(app.client_message().starts_with("Webhook error: "));
    }
}
