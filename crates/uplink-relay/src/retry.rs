//! Pluggable retry policy for webhook delivery.
//!
//! The default is [NoRetry]: one attempt per upload request, matching the
//! documented behavior. [ExponentialBackoff] can be substituted without
//! touching the upload orchestrator.

use std::sync::Arc;
use std::time::Duration;

/// Decides whether (and when) a failed delivery attempt is retried.
///
/// Only connection-level failures consult the policy; upstream rejections
/// and configuration errors are terminal.
pub trait RetryPolicy: Send + Sync {
    /// Delay before the retry following completed attempt number `attempt`
    /// (0-based). `None` stops retrying.
    fn delay_for(&self, attempt: u32) -> Option<Duration>;
}

/// Single-attempt policy: never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn delay_for(&self, _attempt: u32) -> Option<Duration> {
        None
    }
}

/// Bounded exponential backoff: `base_delay * 2^attempt`, capped at
/// `max_delay`, for at most `max_retries` retries.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let delay = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        Some(delay.min(self.max_delay))
    }
}

/// Build the policy for a configured retry count: 0 keeps the single-attempt
/// behavior, anything else enables bounded backoff.
pub fn policy_from_config(max_retries: u32) -> Arc<dyn RetryPolicy> {
    if max_retries == 0 {
        Arc::new(NoRetry)
    } else {
        Arc::new(ExponentialBackoff {
            max_retries,
            ..ExponentialBackoff::default()
        })
    }
}
