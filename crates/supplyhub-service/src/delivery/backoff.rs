//! Exponential retry backoff.

use chrono::Duration;

use supplyhub_core::config::{DeliveryConfig, MAX_BACKOFF_MS};

/// `base * 2^retry_count`, capped at `max` (itself never above
/// [`MAX_BACKOFF_MS`]).
///
/// `retry_count` is the count *after* incrementing, so with a 1s base the
/// first retry waits 2s, the second 4s, and the third 8s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base_ms: u64,
    max_ms: u64,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        let base_ms = base_ms.min(MAX_BACKOFF_MS);
        Self {
            base_ms,
            max_ms: max_ms.clamp(base_ms, MAX_BACKOFF_MS),
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(config.backoff_base_ms, config.backoff_max_ms)
    }

    /// Delay before the pass numbered `retry_count`.
    pub fn delay_for(&self, retry_count: i32) -> Duration {
        let exponent = retry_count.clamp(0, 32) as u32;
        let ms = self
            .base_ms
            .checked_mul(1u64 << exponent)
            .unwrap_or(self.max_ms)
            .min(self.max_ms);
        Duration::milliseconds(ms as i64)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}
