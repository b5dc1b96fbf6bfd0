//! Notification delivery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Longest backoff delay accepted from configuration (30 days).
pub const MAX_BACKOFF_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Which channels a retry pass re-attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryScope {
    /// Only channels without a successful attempt are sent again.
    #[default]
    FailedOnly,
    /// Every channel is sent again on each pass.
    AllChannels,
}

/// Delivery, retry, and channel provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Retries allowed after the first pass.
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    /// Base delay for exponential backoff in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound for a single backoff delay in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Channels re-attempted on retry passes.
    #[serde(default)]
    pub retry_scope: RetryScope,
    /// Per-channel send timeout in seconds.
    #[serde(default = "default_channel_timeout")]
    pub channel_timeout_seconds: u64,
    /// Artificial latency of the simulated email/SMS/push providers.
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
    /// Outbound webhook channel settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

impl DeliveryConfig {
    pub fn channel_timeout(&self) -> Duration {
        Duration::from_secs(self.channel_timeout_seconds)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            retry_scope: RetryScope::default(),
            channel_timeout_seconds: default_channel_timeout(),
            simulated_latency_ms: default_simulated_latency_ms(),
            webhook: WebhookConfig::default(),
        }
    }
}

/// Webhook channel configuration.
///
/// When `url` is unset the webhook channel is simulated like the other
/// providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Target URL receiving a JSON POST per notification.
    #[serde(default)]
    pub url: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: default_webhook_timeout(),
        }
    }
}

fn default_max_retries() -> i32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_max_ms() -> u64 {
    300_000
}

fn default_channel_timeout() -> u64 {
    30
}

fn default_simulated_latency_ms() -> u64 {
    100
}

fn default_webhook_timeout() -> u64 {
    10
}
