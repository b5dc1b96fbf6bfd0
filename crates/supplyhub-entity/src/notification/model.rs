//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::attempt::DeliveryAttempt;
use super::payload::{NotificationData, NotificationTemplate, UserPreferences};
use super::status::{NotificationChannel, NotificationPriority, NotificationStatus, NotificationType};

/// A notification and its delivery bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Owning vendor, if the event is vendor-scoped.
    pub vendor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    #[sqlx(json(nullable))]
    pub data: Option<NotificationData>,
    /// Primary channel.
    pub channel: NotificationChannel,
    /// Ordered, de-duplicated channels attempted on every dispatch pass.
    #[sqlx(json)]
    pub channels: Vec<NotificationChannel>,
    pub status: NotificationStatus,
    /// Retries already scheduled. Never exceeds `max_retries`.
    pub retry_count: i32,
    pub max_retries: i32,
    /// Append-only history of channel sends.
    #[sqlx(json)]
    pub delivery_attempts: Vec<DeliveryAttempt>,
    /// Earliest time the first dispatch may run.
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    #[sqlx(json(nullable))]
    pub user_preferences: Option<UserPreferences>,
    #[sqlx(json(nullable))]
    pub template: Option<NotificationTemplate>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    /// Build a fresh PENDING record from validated creation input.
    pub fn from_create(input: CreateNotification, default_max_retries: i32, now: DateTime<Utc>) -> Self {
        let channels = input.resolved_channels();
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            vendor_id: input.vendor_id,
            notification_type: input.notification_type,
            priority: input.priority.unwrap_or_default(),
            title: input.title,
            message: input.message,
            data: input.data,
            channel: input.channel,
            channels,
            status: NotificationStatus::Pending,
            retry_count: 0,
            max_retries: input.max_retries.unwrap_or(default_max_retries),
            delivery_attempts: Vec::new(),
            scheduled_at: input.scheduled_at,
            sent_at: None,
            delivered_at: None,
            read_at: None,
            failed_at: None,
            failure_reason: None,
            is_active: true,
            expires_at: input.expires_at,
            user_preferences: input.user_preferences,
            template: input.template,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the notification has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Most recent attempt recorded for `channel`.
    pub fn latest_attempt(&self, channel: NotificationChannel) -> Option<&DeliveryAttempt> {
        self.delivery_attempts
            .iter()
            .rev()
            .find(|a| a.channel == channel)
    }

    /// Whether any attempt for `channel` has ever succeeded.
    pub fn has_succeeded_on(&self, channel: NotificationChannel) -> bool {
        self.delivery_attempts
            .iter()
            .any(|a| a.channel == channel && a.is_success())
    }

    /// Whether the retry budget still allows another pass.
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}

/// Data required to create a new notification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateNotification {
    pub user_id: Uuid,
    #[serde(default)]
    pub vendor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub priority: Option<NotificationPriority>,
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    #[serde(default)]
    pub data: Option<NotificationData>,
    pub channel: NotificationChannel,
    /// Channels to attempt. Defaults to `[channel]`.
    #[serde(default)]
    #[validate(length(min = 1, message = "channels must not be empty"))]
    pub channels: Option<Vec<NotificationChannel>>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10))]
    pub max_retries: Option<i32>,
    #[serde(default)]
    pub user_preferences: Option<UserPreferences>,
    #[serde(default)]
    pub template: Option<NotificationTemplate>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateNotification {
    /// Minimal input with every optional field unset.
    pub fn new(
        user_id: Uuid,
        notification_type: NotificationType,
        channel: NotificationChannel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            vendor_id: None,
            notification_type,
            priority: None,
            title: title.into(),
            message: message.into(),
            data: None,
            channel,
            channels: None,
            scheduled_at: None,
            expires_at: None,
            max_retries: None,
            user_preferences: None,
            template: None,
            tags: Vec::new(),
        }
    }

    /// Channels in first-seen order with duplicates removed, or `[channel]`.
    pub fn resolved_channels(&self) -> Vec<NotificationChannel> {
        match &self.channels {
            Some(list) if !list.is_empty() => {
                let mut out = Vec::with_capacity(list.len());
                for ch in list {
                    if !out.contains(ch) {
                        out.push(*ch);
                    }
                }
                out
            }
            _ => vec![self.channel],
        }
    }
}

/// Content fields that may be changed after creation.
///
/// Status, retry bookkeeping, and delivery history are owned by the
/// dispatch path and cannot be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNotification {
    pub priority: Option<NotificationPriority>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub data: Option<NotificationData>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl UpdateNotification {
    /// Merge the set fields into `target`.
    pub fn apply_to(&self, target: &mut Notification, now: DateTime<Utc>) {
        if let Some(priority) = self.priority {
            target.priority = priority;
        }
        if let Some(title) = &self.title {
            target.title.clone_from(title);
        }
        if let Some(message) = &self.message {
            target.message.clone_from(message);
        }
        if let Some(data) = &self.data {
            target.data = Some(data.clone());
        }
        if let Some(at) = self.scheduled_at {
            target.scheduled_at = Some(at);
        }
        if let Some(at) = self.expires_at {
            target.expires_at = Some(at);
        }
        if let Some(active) = self.is_active {
            target.is_active = active;
        }
        if let Some(tags) = &self.tags {
            target.tags.clone_from(tags);
        }
        target.updated_at = now;
    }
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub user_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub notification_type: Option<NotificationType>,
    /// Match any of these statuses; empty matches all.
    pub statuses: Vec<NotificationStatus>,
}

impl NotificationFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, n: &Notification) -> bool {
        self.user_id.is_none_or(|id| n.user_id == id)
            && self.vendor_id.is_none_or(|id| n.vendor_id == Some(id))
            && self.notification_type.is_none_or(|t| n.notification_type == t)
            && (self.statuses.is_empty() || self.statuses.contains(&n.status))
    }
}

/// Aggregate counts over a set of notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NotificationStats {
    pub total: i64,
    /// Status DELIVERED.
    pub delivered: i64,
    /// Status SENT or DELIVERED.
    pub awaiting_read: i64,
    pub read: i64,
    pub pending: i64,
    pub failed: i64,
}

impl NotificationStats {
    /// Fold one notification into the counts.
    pub fn record(&mut self, status: NotificationStatus) {
        self.total += 1;
        match status {
            NotificationStatus::Pending => self.pending += 1,
            NotificationStatus::Sent => self.awaiting_read += 1,
            NotificationStatus::Delivered => {
                self.delivered += 1;
                self.awaiting_read += 1;
            }
            NotificationStatus::Read => self.read += 1,
            NotificationStatus::Failed => self.failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateNotification {
        CreateNotification::new(
            Uuid::new_v4(),
            NotificationType::System,
            NotificationChannel::Email,
            "Maintenance",
            "Scheduled downtime tonight",
        )
    }

    #[test]
    fn channels_default_to_primary() {
        assert_eq!(input().resolved_channels(), vec![NotificationChannel::Email]);
    }

    #[test]
    fn channels_are_deduplicated_in_order() {
        let mut create = input();
        create.channels = Some(vec![
            NotificationChannel::InApp,
            NotificationChannel::Email,
            NotificationChannel::InApp,
        ]);
        assert_eq!(
            create.resolved_channels(),
            vec![NotificationChannel::InApp, NotificationChannel::Email]
        );
    }

    #[test]
    fn from_create_applies_defaults() {
        let now = Utc::now();
        let n = Notification::from_create(input(), 3, now);
        assert_eq!(n.status, NotificationStatus::Pending);
        assert_eq!(n.priority, NotificationPriority::Medium);
        assert_eq!(n.retry_count, 0);
        assert_eq!(n.max_retries, 3);
        assert!(n.is_active);
        assert!(n.delivery_attempts.is_empty());
    }

    #[test]
    fn empty_title_fails_validation() {
        let mut create = input();
        create.title = String::new();
        assert!(create.validate().is_err());
    }

    #[test]
    fn serializes_type_field() {
        let n = Notification::from_create(input(), 3, Utc::now());
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "system");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn stats_fold_counts_awaiting_read() {
        let mut stats = NotificationStats::default();
        for s in [
            NotificationStatus::Delivered,
            NotificationStatus::Delivered,
            NotificationStatus::Pending,
            NotificationStatus::Failed,
        ] {
            stats.record(s);
        }
        assert_eq!(stats.total, 4);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.awaiting_read, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.failed, 1);
    }
}
