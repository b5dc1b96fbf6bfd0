//! Notification lifecycle, priority, type, and channel enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use supplyhub_core::AppError;

/// Lifecycle state of a notification.
///
/// ```text
/// PENDING -> SENT -> DELIVERED -> READ
///    |        |
///    +--------+--> FAILED
/// ```
///
/// A retry moves SENT back to PENDING. DELIVERED and READ never go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Waiting for a dispatch pass.
    Pending,
    /// A dispatch pass is in flight.
    Sent,
    /// Every channel succeeded.
    Delivered,
    /// The recipient has seen it.
    Read,
    /// Permanently failed.
    Failed,
}

impl NotificationStatus {
    /// Statuses counted as "awaiting read" (sent or delivered, not yet read).
    pub const AWAITING_READ: [Self; 2] = [Self::Sent, Self::Delivered];

    pub fn is_awaiting_read(&self) -> bool {
        Self::AWAITING_READ.contains(self)
    }

    /// Whether the notification may transition to READ.
    pub fn can_mark_read(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            "failed" => Ok(Self::Failed),
            _ => Err(AppError::validation(format!(
                "Invalid notification status: '{s}'. Expected one of: pending, sent, delivered, read, failed"
            ))),
        }
    }
}

/// Urgency of a notification.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "notification_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business event a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderStatus,
    Payment,
    Inventory,
    Forecast,
    System,
    VendorApproval,
    SupplierUpdate,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderStatus => "order_status",
            Self::Payment => "payment",
            Self::Inventory => "inventory",
            Self::Forecast => "forecast",
            Self::System => "system",
            Self::VendorApproval => "vendor_approval",
            Self::SupplierUpdate => "supplier_update",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "order_status" => Ok(Self::OrderStatus),
            "payment" => Ok(Self::Payment),
            "inventory" => Ok(Self::Inventory),
            "forecast" => Ok(Self::Forecast),
            "system" => Ok(Self::System),
            "vendor_approval" => Ok(Self::VendorApproval),
            "supplier_update" => Ok(Self::SupplierUpdate),
            _ => Err(AppError::validation(format!(
                "Invalid notification type: '{s}'"
            ))),
        }
    }
}

/// A delivery medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
    InApp,
    Webhook,
}

impl NotificationChannel {
    /// Every supported channel, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Email,
        Self::Sms,
        Self::Push,
        Self::InApp,
        Self::Webhook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Push => "push",
            Self::InApp => "in_app",
            Self::Webhook => "webhook",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
