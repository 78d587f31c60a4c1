//! Object serving endpoint: streams a stored object back by its public path.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use uplink_core::AppError;
use uplink_storage::StorageError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Serve a stored object. The key is the path issued as part of the object's
/// public URL; anything that does not resolve to a stored object is a 404.
#[tracing::instrument(skip(state), fields(operation = "get_object"))]
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let (metadata, stream) = state.storage.resolve(&key).await.map_err(|e| match e {
        StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
            AppError::NotFound("Object not found".to_string())
        }
        other => {
            tracing::error!(error = %other, key = %key, "Failed to read object from storage");
            AppError::Internal(other.to_string())
        }
    })?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, metadata.content_type.as_str())
        .header(header::CONTENT_LENGTH, metadata.size)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
