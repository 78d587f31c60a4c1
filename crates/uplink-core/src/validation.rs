//! Upload validation.
//!
//! Validation is pure and side-effect free: it inspects the declared media
//! type and byte length of a candidate file against the fixed per-category
//! policy and must run before any storage write. There are exactly two
//! rejection reasons per category.

use crate::constants::{
    MAX_PHOTO_SIZE_BYTES, MAX_VIDEO_SIZE_BYTES, PHOTO_CONTENT_TYPES, VIDEO_CONTENT_TYPES,
};
use crate::models::FileCategory;

/// Validation errors for candidate upload files.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: unsupported content type '{content_type}' (allowed: {allowed:?})")]
    UnsupportedType {
        field: &'static str,
        content_type: String,
        allowed: &'static [&'static str],
    },

    #[error("{field}: file size {size} bytes exceeds the maximum of {max} bytes")]
    TooLarge {
        field: &'static str,
        size: usize,
        max: usize,
    },
}

/// Fixed acceptance policy for one upload category.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub content_types: &'static [&'static str],
}

/// Return the policy for the given category.
pub fn policy_for(category: FileCategory) -> UploadPolicy {
    match category {
        FileCategory::Photo => UploadPolicy {
            max_bytes: MAX_PHOTO_SIZE_BYTES,
            content_types: PHOTO_CONTENT_TYPES,
        },
        FileCategory::Video => UploadPolicy {
            max_bytes: MAX_VIDEO_SIZE_BYTES,
            content_types: VIDEO_CONTENT_TYPES,
        },
    }
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate a candidate file's declared media type and byte length against
/// the category policy. A file at exactly the size cap is accepted.
pub fn validate(
    category: FileCategory,
    content_type: &str,
    byte_len: usize,
) -> Result<(), ValidationError> {
    let policy = policy_for(category);

    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !policy.content_types.iter().any(|ct| *ct == normalized) {
        return Err(ValidationError::UnsupportedType {
            field: category.field_name(),
            content_type: content_type.to_string(),
            allowed: policy.content_types,
        });
    }

    if byte_len > policy.max_bytes {
        return Err(ValidationError::TooLarge {
            field: category.field_name(),
            size: byte_len,
            max: policy.max_bytes,
        });
    }

    Ok(())
}
