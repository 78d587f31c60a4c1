//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use uplink_core::Config;
use uplink_relay::WebhookRelay;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    // Initialize telemetry first
    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    // The webhook URL's absence is surfaced per-request with the documented
    // configuration error, not at startup.
    if config.webhook_url.is_none() {
        tracing::warn!(
            "N8N_WEBHOOK_URL is not set; every upload will fail until it is configured"
        );
    }

    // Setup storage
    let storage = uplink_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        path = %config.local_storage_path,
        "Storage initialized"
    );

    // Setup the webhook relay with the configured retry policy
    let retry_policy = uplink_relay::policy_from_config(config.webhook_max_retries);
    let relay = WebhookRelay::new(&config, retry_policy)
        .context("Failed to initialize webhook relay")?;

    let state = Arc::new(AppState::new(config.clone(), storage, relay));

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
