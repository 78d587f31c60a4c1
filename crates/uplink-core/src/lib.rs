//! Uplink Core Library
//!
//! This crate provides the core domain models, error types, configuration,
//! and upload validation shared across all Uplink components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{FileCategory, FilePart, PublicReferences, RelayStrategy, UploadAttempt};
pub use validation::{validate, ValidationError};
