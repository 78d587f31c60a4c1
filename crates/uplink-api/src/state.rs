//! Application state shared across request handlers.

use std::sync::Arc;

use uplink_core::Config;
use uplink_relay::WebhookRelay;
use uplink_storage::Storage;

/// Main application state: configuration plus the two injected
/// collaborators, built once at startup and immutable thereafter.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub relay: WebhookRelay,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>, relay: WebhookRelay) -> Self {
        Self {
            config,
            storage,
            relay,
        }
    }
}
