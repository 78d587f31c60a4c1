//! Health check handlers and response types.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;

/// Run an async check with timeout; returns status string "healthy",
/// "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(crate) struct ReadinessResponse {
    pub status: String,
    pub storage: String,
    pub webhook_configured: bool,
}

/// Liveness probe - process is running.
pub async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - storage backend is reachable. Also reports whether the
/// webhook endpoint is configured, without failing readiness on its absence.
pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = run_check(
        Duration::from_secs(2),
        async {
            state
                .storage
                .exists("readiness-probe.bin")
                .await
                .map(|_| ())
        },
        "storage error",
    )
    .await;

    let healthy = storage == "healthy";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            status: if healthy { "ready" } else { "degraded" }.to_string(),
            storage,
            webhook_configured: state.relay.is_configured(),
        }),
    )
}
