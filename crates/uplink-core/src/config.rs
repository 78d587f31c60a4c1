//! Configuration module
//!
//! Configuration is loaded once from the process environment at startup and
//! is immutable thereafter. The webhook endpoint is deliberately optional at
//! load time: its absence is surfaced per-request with the documented
//! configuration error, so `from_env` only fails on malformed values.

use std::env;

use crate::constants::{MAX_PHOTO_SIZE_BYTES, MAX_VIDEO_SIZE_BYTES};
use crate::models::RelayStrategy;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_PATH: &str = "./data/objects";

/// Headroom for multipart framing on top of the two file size caps when
/// bounding the inbound request body.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Workflow webhook endpoint. `None` means every upload fails with the
    /// configuration error until the variable is set.
    pub webhook_url: Option<String>,
    pub relay_strategy: RelayStrategy,
    pub webhook_timeout_seconds: u64,
    /// Retry attempts after the first delivery attempt. 0 preserves the
    /// single-attempt behavior.
    pub webhook_max_retries: u32,
    pub local_storage_path: String,
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let relay_strategy = env::var("RELAY_STRATEGY")
            .unwrap_or_else(|_| RelayStrategy::BinaryPassthrough.as_str().to_string())
            .parse::<RelayStrategy>()
            .map_err(|e| anyhow::anyhow!("RELAY_STRATEGY: {}", e))?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port));

        let config = Config {
            server_port,
            environment,
            cors_origins,
            webhook_url: env::var("N8N_WEBHOOK_URL").ok().filter(|s| !s.trim().is_empty()),
            relay_strategy,
            webhook_timeout_seconds: env::var("WEBHOOK_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_WEBHOOK_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
            webhook_max_retries: env::var("WEBHOOK_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string()),
            public_base_url,
        };

        Ok(config)
    }

    /// Validate the loaded configuration; called once before serving any
    /// request. Malformed values fail fast here. An *absent* webhook URL is
    /// not an error at this point (see the module docs).
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(url) = &self.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "N8N_WEBHOOK_URL must be an http(s) URL, got '{}'",
                    url
                ));
            }
        }

        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must be an http(s) URL, got '{}'",
                self.public_base_url
            ));
        }

        if self.webhook_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("WEBHOOK_TIMEOUT_SECS must be greater than 0"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Upper bound for the inbound request body: both files at their caps
    /// plus multipart framing. Oversized bodies are rejected at the parsing
    /// layer before being fully buffered.
    pub fn max_request_body_bytes(&self) -> usize {
        MAX_PHOTO_SIZE_BYTES + MAX_VIDEO_SIZE_BYTES + MULTIPART_OVERHEAD_BYTES
    }
}
