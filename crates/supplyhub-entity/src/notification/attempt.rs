//! Delivery attempt records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::NotificationChannel;

/// Outcome of a single channel send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Failed,
}

/// One entry of a notification's append-only delivery history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    /// When the send finished.
    pub timestamp: DateTime<Utc>,
    /// Channel that was attempted.
    pub channel: NotificationChannel,
    /// Result of the send.
    pub status: AttemptStatus,
    /// Provider error text on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryAttempt {
    pub fn success(channel: NotificationChannel, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            channel,
            status: AttemptStatus::Success,
            error: None,
        }
    }

    pub fn failure(
        channel: NotificationChannel,
        at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: at,
            channel,
            status: AttemptStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AttemptStatus::Success
    }
}
