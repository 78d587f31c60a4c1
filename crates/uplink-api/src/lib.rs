//! Uplink API Library
//!
//! This crate provides the HTTP handlers, middleware, and application setup
//! for the upload relay service.

// Module declarations
pub mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
mod telemetry;

// Public modules
pub mod error;

// Re-exports
pub use error::ErrorResponse;
pub use state::AppState;
