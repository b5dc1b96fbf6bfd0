//! Channel sender interface and registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use supplyhub_core::config::DeliveryConfig;
use supplyhub_core::error::AppError;
use supplyhub_entity::notification::{Notification, NotificationChannel};

use super::senders::{InAppSender, SimulatedSender, WebhookSender};

/// Why a single channel send failed.
///
/// These never reach API callers. The orchestrator records them as failed
/// delivery attempts.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("No sender registered for channel {0}")]
    Unsupported(NotificationChannel),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider rejected message with HTTP {0}")]
    Rejected(u16),

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivers a notification over one channel.
///
/// Implementations must not mutate the notification record; outcome
/// bookkeeping belongs to the orchestrator.
#[async_trait]
pub trait ChannelSender: Send + Sync + 'static {
    /// The channel this sender serves.
    fn channel(&self) -> NotificationChannel;

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError>;
}

/// Channel kind to sender lookup.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    senders: HashMap<NotificationChannel, Arc<dyn ChannelSender>>,
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.senders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a sender for every channel, built from configuration.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, AppError> {
        let latency = config.simulated_latency();
        let mut registry = Self::new();
        registry.register(Arc::new(SimulatedSender::new(NotificationChannel::Email, latency)));
        registry.register(Arc::new(SimulatedSender::new(NotificationChannel::Sms, latency)));
        registry.register(Arc::new(SimulatedSender::new(NotificationChannel::Push, latency)));
        registry.register(Arc::new(InAppSender));

        match &config.webhook.url {
            Some(url) => registry.register(Arc::new(WebhookSender::new(url, &config.webhook)?)),
            None => registry.register(Arc::new(SimulatedSender::new(
                NotificationChannel::Webhook,
                latency,
            ))),
        }
        Ok(registry)
    }

    /// Register a sender, replacing any previous sender for its channel.
    pub fn register(&mut self, sender: Arc<dyn ChannelSender>) {
        self.senders.insert(sender.channel(), sender);
    }

    pub fn get(&self, channel: NotificationChannel) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.get(&channel)
    }

    pub fn supports(&self, channel: NotificationChannel) -> bool {
        self.senders.contains_key(&channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_channel() {
        let registry = ChannelRegistry::from_config(&DeliveryConfig::default()).unwrap();
        for channel in NotificationChannel::ALL {
            assert!(registry.supports(channel), "missing sender for {channel}");
        }
    }

    #[test]
    fn empty_registry_supports_nothing() {
        assert!(!ChannelRegistry::new().supports(NotificationChannel::Email));
    }
}
