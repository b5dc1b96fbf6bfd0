//! Notification persistence interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use supplyhub_core::result::AppResult;
use supplyhub_entity::notification::{
    DeliveryAttempt, Notification, NotificationFilter, NotificationStats, UpdateNotification,
};

/// Durable storage of notification records.
///
/// Status-changing writes are conditional on the current status so a
/// record never regresses from DELIVERED or READ. Each of them returns
/// whether a row actually changed.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Persist a new record and return it as stored.
    async fn create(&self, notification: &Notification) -> AppResult<Notification>;

    /// Records matching `filter`, newest first.
    async fn find_all(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// Merge content fields. `None` when the record does not exist.
    async fn update(
        &self,
        id: Uuid,
        patch: &UpdateNotification,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>>;

    /// Remove a record. Returns `false` when it did not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Atomically move a PENDING record to SENT and return it.
    ///
    /// `sent_at` is only set on the first pass. Returns `None` when the
    /// record is missing or not PENDING.
    async fn begin_dispatch(&self, id: Uuid, now: DateTime<Utc>)
    -> AppResult<Option<Notification>>;

    /// Append one entry to the delivery history.
    async fn append_attempt(&self, id: Uuid, attempt: &DeliveryAttempt) -> AppResult<bool>;

    /// SENT -> DELIVERED.
    async fn mark_delivered(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// SENT -> PENDING with the incremented retry count.
    async fn schedule_retry(
        &self,
        id: Uuid,
        retry_count: i32,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// SENT -> PENDING for a pass abandoned by a dead worker. Only applies
    /// when the record has not been touched since `updated_before`.
    async fn reclaim_dispatch(
        &self,
        id: Uuid,
        updated_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Active PENDING or SENT records last touched before `updated_before`.
    async fn find_stalled(&self, updated_before: DateTime<Utc>) -> AppResult<Vec<Notification>>;

    /// PENDING or SENT -> FAILED.
    async fn mark_failed(&self, id: Uuid, reason: &str, now: DateTime<Utc>) -> AppResult<bool>;

    /// Any non-FAILED status -> READ. An existing `read_at` is kept.
    async fn mark_read(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Notification>>;

    /// SENT or DELIVERED -> READ for every record of `user_id`.
    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Counts by status, optionally restricted to one recipient.
    async fn stats(&self, user_id: Option<Uuid>) -> AppResult<NotificationStats>;

    /// Soft-deactivate active records whose `expires_at` has passed.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
