//! Structured JSON payloads carried on a notification row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::NotificationChannel;

/// Business references attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Forecast kind (`demand`, `supply`, ...), serialized as `type`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub forecast_type: Option<String>,
    /// Deep link the frontend opens when the notification is clicked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    /// Free-form extra fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Reference to the message template a notification was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
}

/// Quiet hours window, stored for the frontend and not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuietHours {
    /// Local start time, `HH:MM`.
    pub start: String,
    /// Local end time, `HH:MM`.
    pub end: String,
    /// IANA timezone name.
    pub timezone: String,
}

/// Snapshot of the recipient's channel preferences at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    #[serde(default = "default_true")]
    pub sms_enabled: bool,
    #[serde(default = "default_true")]
    pub push_enabled: bool,
    #[serde(default = "default_true")]
    pub in_app_enabled: bool,
    #[serde(default = "default_true")]
    pub webhook_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours: Option<QuietHours>,
}

impl UserPreferences {
    /// Whether the recipient accepts notifications on `channel`.
    pub fn allows(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Email => self.email_enabled,
            NotificationChannel::Sms => self.sms_enabled,
            NotificationChannel::Push => self.push_enabled,
            NotificationChannel::InApp => self.in_app_enabled,
            NotificationChannel::Webhook => self.webhook_enabled,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: true,
            push_enabled: true,
            in_app_enabled: true,
            webhook_enabled: true,
            quiet_hours: None,
        }
    }
}

fn default_true() -> bool {
    true
}
