//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

/// Storage backend discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Metadata persisted beside each object, used for content-type negotiation
/// when the object is served back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub original_filename: String,
    pub content_type: String,
    pub size: u64,
}

/// A durably stored object with its stable public reference.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Opaque adapter-generated key.
    pub key: String,
    /// Stable, publicly fetchable URL resolving to this object's bytes.
    pub public_url: String,
    pub content_type: String,
    pub original_filename: String,
    pub size: u64,
}

/// Chunked object body yielded by [Storage::resolve].
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// Backends must be safe under concurrent writers: every `store` call uses a
/// fresh adapter-generated key, so concurrent stores never collide, and a
/// store either fully succeeds or leaves no partially-visible object.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Durably store a byte buffer under a fresh key and return the stored
    /// object with its public URL.
    ///
    /// The original filename is retained as metadata only; it is never the
    /// sole identifier of the object.
    async fn store(
        &self,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Resolve a previously issued key back to its metadata and a byte
    /// stream.
    ///
    /// Returns `NotFound` when the key never existed (including malformed
    /// keys and keys whose metadata is gone); any other failure maps to an
    /// I/O-class error. The body is streamed, never buffered whole.
    async fn resolve(&self, key: &str) -> StorageResult<(ObjectMetadata, ObjectStream)>;

    /// Check whether an object exists under the given key.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
