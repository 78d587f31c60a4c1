//! Fixed upload policy and wire-contract constants.
//!
//! The accepted media types and size caps are part of the public contract and
//! are deliberately not runtime-configurable.

/// Maximum accepted photo size in bytes (10 MiB), boundary inclusive.
pub const MAX_PHOTO_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum accepted video size in bytes (100 MiB), boundary inclusive.
pub const MAX_VIDEO_SIZE_BYTES: usize = 100 * 1024 * 1024;

/// Media types accepted for the `photo` field.
pub const PHOTO_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Media types accepted for the `video` field.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/x-msvideo"];

/// Error body returned when a request carries neither a photo nor a video.
pub const NO_FILES_MESSAGE: &str = "At least one file (photo or video) is required";

/// Error body returned when the webhook endpoint is not configured.
pub const WEBHOOK_NOT_CONFIGURED_MESSAGE: &str =
    "Webhook URL not configured. Please set N8N_WEBHOOK_URL environment variable.";

/// Generic error body for storage and other internal upload failures.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload files";

/// Message returned alongside a successful relay.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Files uploaded successfully";

/// Prefix applied to upstream webhook failures surfaced to the caller.
pub const WEBHOOK_ERROR_PREFIX: &str = "Webhook error: ";
