//! Webhook relay client.
//!
//! Packages validated upload data per the configured strategy and performs
//! the outbound POST to the workflow endpoint, classifying failures into
//! the relay error taxonomy.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use uplink_core::models::{PublicReferences, UploadAttempt};
use uplink_core::Config;

use crate::retry::RetryPolicy;

/// Relay failure classification.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Webhook URL not configured")]
    NotConfigured,

    /// The endpoint responded with a non-2xx status; the raw body is kept so
    /// the caller can surface the upstream message.
    #[error("Webhook returned status {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    /// No response was received (connect, timeout, DNS).
    #[error("Webhook unreachable: {0}")]
    Unreachable(String),

    #[error("Failed to build relay payload: {0}")]
    Payload(String),
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Upstream response to a successful delivery. The body is parsed as JSON
/// when possible and kept as a raw string otherwise.
#[derive(Debug, Clone)]
pub struct WebhookResult {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Client for delivering upload payloads to the workflow webhook.
pub struct WebhookRelay {
    endpoint: Option<String>,
    http_client: Client,
    retry_policy: Arc<dyn RetryPolicy>,
}

impl WebhookRelay {
    pub fn new(config: &Config, retry_policy: Arc<dyn RetryPolicy>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_seconds))
            .user_agent("uplink-relay/1.0")
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client for webhook relay")?;

        Ok(Self {
            endpoint: config.webhook_url.clone(),
            http_client,
            retry_policy,
        })
    }

    /// Whether a webhook endpoint is configured. Checked by the orchestrator
    /// before any store write (fail fast).
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn endpoint(&self) -> RelayResult<&str> {
        self.endpoint.as_deref().ok_or(RelayError::NotConfigured)
    }

    /// Binary passthrough: re-encode the original byte buffers as an
    /// outgoing `multipart/form-data` body. No size cap is applied.
    #[tracing::instrument(skip(self, attempt))]
    pub async fn relay_binary(&self, attempt: &UploadAttempt) -> RelayResult<WebhookResult> {
        let url = self.endpoint()?.to_string();
        self.send_with_retry(|| {
            let form = multipart_form(attempt)?;
            Ok(self.http_client.post(&url).multipart(form))
        })
        .await
    }

    /// Reference relay: send only the public URLs of already-stored objects.
    #[tracing::instrument(skip(self, references))]
    pub async fn relay_references(
        &self,
        references: &PublicReferences,
    ) -> RelayResult<WebhookResult> {
        let url = self.endpoint()?.to_string();
        self.send_with_retry(|| Ok(self.http_client.post(&url).json(references)))
            .await
    }

    /// Deliver the request, consulting the retry policy on connection-level
    /// failures only. Upstream rejections are terminal.
    async fn send_with_retry<B>(&self, build: B) -> RelayResult<WebhookResult>
    where
        B: Fn() -> RelayResult<reqwest::RequestBuilder>,
    {
        let mut attempt: u32 = 0;
        loop {
            let request = build()?;
            match Self::execute(request).await {
                Ok(result) => {
                    tracing::info!(
                        status = result.status,
                        attempt = attempt,
                        "Webhook delivered successfully"
                    );
                    return Ok(result);
                }
                Err(RelayError::Unreachable(detail)) => {
                    match self.retry_policy.delay_for(attempt) {
                        Some(delay) => {
                            tracing::warn!(
                                attempt = attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %detail,
                                "Webhook unreachable, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        None => return Err(RelayError::Unreachable(detail)),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute(request: reqwest::RequestBuilder) -> RelayResult<WebhookResult> {
        let response = request
            .send()
            .await
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Failed to read response body"));

        if (200..300).contains(&status) {
            let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
            Ok(WebhookResult { status, body })
        } else {
            Err(RelayError::UpstreamRejected { status, body })
        }
    }
}

/// Rebuild the inbound files as outgoing multipart parts, preserving the
/// original filename and content type of each.
fn multipart_form(attempt: &UploadAttempt) -> RelayResult<Form> {
    let mut form = Form::new();
    for (category, part) in attempt.parts() {
        let file_part = Part::stream(reqwest::Body::from(part.data.clone()))
            .file_name(part.original_filename.clone())
            .mime_str(&part.content_type)
            .map_err(|e| {
                RelayError::Payload(format!(
                    "Invalid content type '{}': {}",
                    part.content_type, e
                ))
            })?;
        form = form.part(category.field_name(), file_part);
    }
    Ok(form)
}

impl RelayError {
    /// The message surfaced to the caller for upstream rejections: the
    /// upstream body's `message` field when it is JSON, otherwise the same
    /// summary an HTTP client library would produce.
    pub fn upstream_message(&self) -> Option<String> {
        match self {
            RelayError::UpstreamRejected { status, body } => {
                let from_body = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));
                Some(from_body.unwrap_or_else(|| {
                    format!("Request failed with status code {}", status)
                }))
            }
            _ => None,
        }
    }
}
