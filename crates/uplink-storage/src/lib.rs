//! Uplink Storage Library
//!
//! This crate provides the object store abstraction and its local filesystem
//! implementation.
//!
//! # Object keys
//!
//! Keys are adapter-generated and collision-resistant: `{uuid}.{ext}`, where
//! the extension is derived from (but never the whole of) the original
//! filename. The original filename and content type live in a sidecar
//! metadata file next to the object so reads can negotiate content type
//! without a database. Keys must not contain `..` or a leading `/`; key
//! generation is centralized in the `keys` module.

pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{
    ObjectMetadata, ObjectStream, Storage, StorageBackend, StorageError, StorageResult,
    StoredObject,
};
