//! Error types module
//!
//! This module provides the unified `AppError` used throughout Uplink.
//! Domain-specific errors (validation, storage, relay) are defined next to
//! their modules and converted into `AppError` at the HTTP boundary, where
//! the `ErrorMetadata` impl decides the status code, the client-facing
//! message, and the log level.

use std::io;

use crate::constants::{
    UPLOAD_FAILED_MESSAGE, WEBHOOK_ERROR_PREFIX, WEBHOOK_NOT_CONFIGURED_MESSAGE,
};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like upstream rejections
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
/// This trait allows errors to self-describe their HTTP response characteristics.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Client-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Webhook URL not configured")]
    WebhookNotConfigured,

    #[error("Webhook rejected the relay with status {status}: {message}")]
    WebhookRejected { status: u16, message: String },

    #[error("Webhook unreachable: {0}")]
    WebhookUnreachable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl AppError {
    /// Error type name for structured logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::WebhookNotConfigured => "WebhookNotConfigured",
            AppError::WebhookRejected { .. } => "WebhookRejected",
            AppError::WebhookUnreachable(_) => "WebhookUnreachable",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Detailed error information including the source chain, for logs only.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::WebhookNotConfigured => 500,
            // Mirror the upstream status to the caller where possible.
            AppError::WebhookRejected { status, .. } => *status,
            AppError::WebhookUnreachable(_) => 502,
            AppError::Storage(_) => 500,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => 500,
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::WebhookNotConfigured => WEBHOOK_NOT_CONFIGURED_MESSAGE.to_string(),
            AppError::WebhookRejected { message, .. } => {
                format!("{}{}", WEBHOOK_ERROR_PREFIX, message)
            }
            AppError::WebhookUnreachable(detail) => {
                format!("{}{}", WEBHOOK_ERROR_PREFIX, detail)
            }
            AppError::Storage(_) => UPLOAD_FAILED_MESSAGE.to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => LogLevel::Debug,
            AppError::WebhookNotConfigured | AppError::WebhookRejected { .. } => LogLevel::Warn,
            AppError::WebhookUnreachable(_)
            | AppError::Storage(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_metadata() {
        let err = AppError::InvalidInput("bad field".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "bad field");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_webhook_not_configured_uses_contract_message() {
        let err = AppError::WebhookNotConfigured;
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), WEBHOOK_NOT_CONFIGURED_MESSAGE);
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_webhook_rejected_mirrors_upstream_status() {
        let err = AppError::WebhookRejected {
            status: 422,
            message: "bad payload".to_string(),
        };
        assert_eq!(err.http_status_code(), 422);
        assert_eq!(err.client_message(), "Webhook error: bad payload");
    }

    #[test]
    fn test_webhook_unreachable_is_bad_gateway() {
        let err = AppError::WebhookUnreachable("connection refused".to_string());
        assert_eq!(err.http_status_code(), 502);
        assert!(err.client_message().starts_with("Webhook error: "));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_storage_error_hides_detail() {
        let err = AppError::Storage("disk full on /data".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), UPLOAD_FAILED_MESSAGE);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("root cause");
        let err = AppError::InternalWithSource {
            message: "wrapper".to_string(),
            source,
        };
        assert!(err.detailed_message().contains("Caused by: root cause"));
    }
}
