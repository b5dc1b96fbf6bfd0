//! Built-in channel senders.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use supplyhub_core::config::WebhookConfig;
use supplyhub_core::error::{AppError, ErrorKind};
use supplyhub_entity::notification::{Notification, NotificationChannel};

use super::channel::{ChannelError, ChannelSender};

/// Stand-in for an external provider (mail relay, SMS gateway, push
/// service). Logs the message and waits a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedSender {
    channel: NotificationChannel,
    latency: Duration,
}

impl SimulatedSender {
    pub fn new(channel: NotificationChannel, latency: Duration) -> Self {
        Self { channel, latency }
    }
}

#[async_trait]
impl ChannelSender for SimulatedSender {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        info!(
            channel = %self.channel,
            notification_id = %notification.id,
            user_id = %notification.user_id,
            title = %notification.title,
            "Sending notification"
        );
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(())
    }
}

/// In-app notifications are rendered by the frontend from the stored
/// record, so sending only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct InAppSender;

#[async_trait]
impl ChannelSender for InAppSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::InApp
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        debug!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            "In-app notification available"
        );
        Ok(())
    }
}

/// POSTs a JSON envelope for each notification to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookSender {
    pub fn new(url: &str, config: &WebhookConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build webhook HTTP client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    fn payload(notification: &Notification) -> serde_json::Value {
        json!({
            "id": notification.id,
            "user_id": notification.user_id,
            "vendor_id": notification.vendor_id,
            "type": notification.notification_type,
            "priority": notification.priority,
            "title": notification.title,
            "message": notification.message,
            "data": notification.data,
            "created_at": notification.created_at,
        })
    }
}

#[async_trait]
impl ChannelSender for WebhookSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Webhook
    }

    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(notification))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ChannelError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use supplyhub_entity::notification::{CreateNotification, NotificationType};
    use uuid::Uuid;

    fn sample() -> Notification {
        let input = CreateNotification::new(
            Uuid::new_v4(),
            NotificationType::Payment,
            NotificationChannel::Webhook,
            "Payment completed",
            "Payment PAY-1 for $10 has been completed",
        );
        Notification::from_create(input, 3, Utc::now())
    }

    #[tokio::test]
    async fn simulated_sender_succeeds() {
        let sender = SimulatedSender::new(NotificationChannel::Email, Duration::ZERO);
        assert!(sender.send(&sample()).await.is_ok());
    }

    #[test]
    fn webhook_payload_uses_wire_names() {
        let payload = WebhookSender::payload(&sample());
        assert_eq!(payload["type"], "payment");
        assert_eq!(payload["priority"], "medium");
    }
}
