//! Upload orchestrator.
//!
//! Request flow: parse multipart (per-field size caps enforced while
//! buffering) -> reject empty attempts -> fail fast on a missing webhook
//! endpoint -> validate every present file (all-or-nothing) -> store
//! (reference relay only) -> relay -> respond. Validation strictly precedes
//! storage, which strictly precedes the relay call. Objects stored before a
//! failed relay are not rolled back.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use uplink_core::constants::{NO_FILES_MESSAGE, UPLOAD_SUCCESS_MESSAGE};
use uplink_core::models::{FileCategory, FilePart, PublicReferences, RelayStrategy, UploadAttempt};
use uplink_core::validation::{self, ValidationError};
use uplink_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Success body for `POST /api/upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Public references of the stored objects; present only for the
    /// reference-relay strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_files: Option<PublicReferences>,
    pub webhook_response: serde_json::Value,
}

/// Upload handler
///
/// Accepts optional `photo` and `video` multipart fields (at most one file
/// each) and forwards them to the configured workflow webhook, either as raw
/// bytes or as stored-object references depending on the relay strategy.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let (photo, video) = extract_upload_fields(multipart).await?;

    let attempt = UploadAttempt::from_parts(photo, video)
        .ok_or_else(|| AppError::InvalidInput(NO_FILES_MESSAGE.to_string()))?;

    // An unconfigured endpoint fails every upload, before validation and
    // before any store write.
    if !state.relay.is_configured() {
        return Err(AppError::WebhookNotConfigured.into());
    }

    // All-or-nothing: the first rejection short-circuits the whole request.
    for (category, part) in attempt.parts() {
        validation::validate(category, &part.content_type, part.len())?;
    }

    tracing::info!(
        has_photo = attempt.photo().is_some(),
        has_video = attempt.video().is_some(),
        total_bytes = attempt.total_bytes(),
        strategy = %state.config.relay_strategy,
        "Processing upload"
    );

    let (uploaded_files, result) = match state.config.relay_strategy {
        RelayStrategy::BinaryPassthrough => {
            let result = state.relay.relay_binary(&attempt).await?;
            (None, result)
        }
        RelayStrategy::ReferenceRelay => {
            let references = store_attempt(&state, &attempt).await?;
            let result = state.relay.relay_references(&references).await?;
            (Some(references), result)
        }
    };

    Ok(Json(UploadResponse {
        success: true,
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        uploaded_files,
        webhook_response: result.body,
    }))
}

/// Store every present file and collect the public references to relay.
async fn store_attempt(
    state: &AppState,
    attempt: &UploadAttempt,
) -> Result<PublicReferences, HttpAppError> {
    let mut references = PublicReferences::default();

    for (category, part) in attempt.parts() {
        let stored = state
            .storage
            .store(&part.original_filename, &part.content_type, part.data.clone())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, field = %category, "Failed to store upload");
                HttpAppError::from(e)
            })?;

        tracing::info!(
            field = %category,
            key = %stored.key,
            public_url = %stored.public_url,
            size_bytes = stored.size,
            "Upload stored"
        );

        references.set(category, stored.public_url);
    }

    Ok(references)
}

/// Extract the optional `photo` and `video` fields from the multipart form.
/// A repeated field is rejected; unknown fields are skipped. Each field is
/// buffered incrementally against its category's size cap, so an oversized
/// file is rejected as `too-large` before it is fully read.
async fn extract_upload_fields(
    mut multipart: Multipart,
) -> Result<(Option<FilePart>, Option<FilePart>), HttpAppError> {
    let mut photo: Option<FilePart> = None;
    let mut video: Option<FilePart> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        HttpAppError::from(AppError::InvalidInput(format!(
            "Failed to read multipart request: {}",
            e
        )))
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let (category, slot) = match name.as_str() {
            "photo" => (FileCategory::Photo, &mut photo),
            "video" => (FileCategory::Video, &mut video),
            _ => continue,
        };

        if slot.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Duplicate '{}' field; at most one file per field is accepted",
                name
            ))
            .into());
        }

        let original_filename = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let max_bytes = validation::policy_for(category).max_bytes;
        let mut data: Vec<u8> = Vec::new();

        while let Some(chunk) = field.chunk().await.map_err(|e| {
            HttpAppError::from(AppError::InvalidInput(format!(
                "Failed to read '{}' file data: {}",
                name, e
            )))
        })? {
            if data.len() + chunk.len() > max_bytes {
                return Err(ValidationError::TooLarge {
                    field: category.field_name(),
                    size: data.len() + chunk.len(),
                    max: max_bytes,
                }
                .into());
            }
            data.extend_from_slice(&chunk);
        }

        *slot = Some(FilePart::new(
            Bytes::from(data),
            original_filename,
            content_type,
        ));
    }

    Ok((photo, video))
}
