//! In-memory notification store backed by `dashmap`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use supplyhub_core::error::AppError;
use supplyhub_core::result::AppResult;
use supplyhub_entity::notification::{
    DeliveryAttempt, Notification, NotificationFilter, NotificationStats, NotificationStatus,
    UpdateNotification,
};

use crate::store::NotificationStore;

/// Process-local notification store.
///
/// Conditional writes hold the entry's shard lock for the whole
/// check-and-set, which gives the same atomicity as the SQL `WHERE status`
/// guards.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    records: DashMap<Uuid, Notification>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to the record if `guard` accepts its status.
    fn transition<F>(&self, id: Uuid, guard: &[NotificationStatus], f: F) -> Option<Notification>
    where
        F: FnOnce(&mut Notification),
    {
        let mut entry = self.records.get_mut(&id)?;
        if !guard.contains(&entry.status) {
            return None;
        }
        f(entry.value_mut());
        Some(entry.clone())
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, notification: &Notification) -> AppResult<Notification> {
        match self.records.entry(notification.id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Notification {} already exists",
                notification.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(notification.clone());
                Ok(notification.clone())
            }
        }
    }

    async fn find_all(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>> {
        let mut out: Vec<Notification> = self
            .records
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &UpdateNotification,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        Ok(self.records.get_mut(&id).map(|mut entry| {
            patch.apply_to(entry.value_mut(), now);
            entry.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    async fn begin_dispatch(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        Ok(self.transition(id, &[NotificationStatus::Pending], |n| {
            n.status = NotificationStatus::Sent;
            n.sent_at.get_or_insert(now);
            n.updated_at = now;
        }))
    }

    async fn append_attempt(&self, id: Uuid, attempt: &DeliveryAttempt) -> AppResult<bool> {
        Ok(self
            .records
            .get_mut(&id)
            .map(|mut entry| {
                entry.delivery_attempts.push(attempt.clone());
                entry.updated_at = attempt.timestamp;
            })
            .is_some())
    }

    async fn mark_delivered(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        Ok(self
            .transition(id, &[NotificationStatus::Sent], |n| {
                n.status = NotificationStatus::Delivered;
                n.delivered_at = Some(now);
                n.updated_at = now;
            })
            .is_some())
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        retry_count: i32,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut entry = match self.records.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(false),
        };
        if entry.status != NotificationStatus::Sent || retry_count > entry.max_retries {
            return Ok(false);
        }
        entry.status = NotificationStatus::Pending;
        entry.retry_count = retry_count;
        entry.updated_at = now;
        Ok(true)
    }

    async fn reclaim_dispatch(
        &self,
        id: Uuid,
        updated_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut entry = match self.records.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(false),
        };
        if entry.status != NotificationStatus::Sent || entry.updated_at >= updated_before {
            return Ok(false);
        }
        entry.status = NotificationStatus::Pending;
        entry.updated_at = now;
        Ok(true)
    }

    async fn find_stalled(&self, updated_before: DateTime<Utc>) -> AppResult<Vec<Notification>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| {
                entry.is_active
                    && matches!(entry.status, NotificationStatus::Pending | NotificationStatus::Sent)
                    && entry.updated_at < updated_before
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str, now: DateTime<Utc>) -> AppResult<bool> {
        Ok(self
            .transition(
                id,
                &[NotificationStatus::Pending, NotificationStatus::Sent],
                |n| {
                    n.status = NotificationStatus::Failed;
                    n.failed_at = Some(now);
                    n.failure_reason = Some(reason.to_string());
                    n.updated_at = now;
                },
            )
            .is_some())
    }

    async fn mark_read(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Notification>> {
        Ok(self.transition(
            id,
            &[
                NotificationStatus::Pending,
                NotificationStatus::Sent,
                NotificationStatus::Delivered,
                NotificationStatus::Read,
            ],
            |n| {
                n.status = NotificationStatus::Read;
                n.read_at.get_or_insert(now);
                n.updated_at = now;
            },
        ))
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let mut count = 0;
        for mut entry in self.records.iter_mut() {
            if entry.user_id == user_id && entry.status.is_awaiting_read() {
                entry.status = NotificationStatus::Read;
                entry.read_at = Some(now);
                entry.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn stats(&self, user_id: Option<Uuid>) -> AppResult<NotificationStats> {
        let mut stats = NotificationStats::default();
        for entry in self.records.iter() {
            if user_id.is_none_or(|id| entry.user_id == id) {
                stats.record(entry.status);
            }
        }
        Ok(stats)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut count = 0;
        for mut entry in self.records.iter_mut() {
            if entry.is_active && entry.is_expired_at(now) {
                entry.is_active = false;
                entry.updated_at = now;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use supplyhub_entity::notification::{CreateNotification, NotificationChannel, NotificationType};

    fn make_notification(user_id: Uuid, created_at: DateTime<Utc>) -> Notification {
        let input = CreateNotification::new(
            user_id,
            NotificationType::Inventory,
            NotificationChannel::InApp,
            "Low stock",
            "SKU-42 is below its reorder point",
        );
        Notification::from_create(input, 3, created_at)
    }

    async fn insert_with_status(
        store: &MemoryNotificationStore,
        user_id: Uuid,
        status: NotificationStatus,
    ) -> Uuid {
        let mut n = make_notification(user_id, Utc::now());
        n.status = status;
        store.create(&n).await.unwrap().id
    }

    async fn status_of(store: &MemoryNotificationStore, id: Uuid) -> NotificationStatus {
        store.find_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn find_all_returns_newest_first() {
        let store = MemoryNotificationStore::new();
        let user = Uuid::new_v4();
        let t0 = Utc::now();
        let older = store.create(&make_notification(user, t0)).await.unwrap();
        let newer = store
            .create(&make_notification(user, t0 + Duration::seconds(5)))
            .await
            .unwrap();

        let all = store.find_all(&NotificationFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
    }

    #[tokio::test]
    async fn begin_dispatch_only_wins_once() {
        let store = MemoryNotificationStore::new();
        let id = insert_with_status(&store, Uuid::new_v4(), NotificationStatus::Pending).await;
        let now = Utc::now();

        let first = store.begin_dispatch(id, now).await.unwrap();
        let second = store.begin_dispatch(id, now).await.unwrap();

        assert_eq!(first.unwrap().status, NotificationStatus::Sent);
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn sent_at_is_kept_across_passes() {
        let store = MemoryNotificationStore::new();
        let id = insert_with_status(&store, Uuid::new_v4(), NotificationStatus::Pending).await;
        let t0 = Utc::now();

        store.begin_dispatch(id, t0).await.unwrap();
        assert!(store.schedule_retry(id, 1, t0).await.unwrap());
        let second = store
            .begin_dispatch(id, t0 + Duration::seconds(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.sent_at, Some(t0));
    }

    #[tokio::test]
    async fn delivered_is_never_failed() {
        let store = MemoryNotificationStore::new();
        let id = insert_with_status(&store, Uuid::new_v4(), NotificationStatus::Delivered).await;

        assert!(!store.mark_failed(id, "late error", Utc::now()).await.unwrap());
        let n = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(n.status, NotificationStatus::Delivered);
    }

    #[tokio::test]
    async fn mark_all_read_only_touches_awaiting_read_of_user() {
        let store = MemoryNotificationStore::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sent = insert_with_status(&store, user, NotificationStatus::Sent).await;
        let delivered = insert_with_status(&store, user, NotificationStatus::Delivered).await;
        let pending = insert_with_status(&store, user, NotificationStatus::Pending).await;
        let foreign = insert_with_status(&store, other, NotificationStatus::Delivered).await;

        let changed = store.mark_all_read(user, Utc::now()).await.unwrap();
        assert_eq!(changed, 2);

        assert_eq!(status_of(&store, sent).await, NotificationStatus::Read);
        assert_eq!(status_of(&store, delivered).await, NotificationStatus::Read);
        assert_eq!(status_of(&store, pending).await, NotificationStatus::Pending);
        assert_eq!(status_of(&store, foreign).await, NotificationStatus::Delivered);
    }

    #[tokio::test]
    async fn deactivate_expired_is_soft() {
        let store = MemoryNotificationStore::new();
        let now = Utc::now();
        let mut expired = make_notification(Uuid::new_v4(), now);
        expired.expires_at = Some(now - Duration::minutes(1));
        let mut live = make_notification(Uuid::new_v4(), now);
        live.expires_at = Some(now + Duration::hours(1));
        store.create(&expired).await.unwrap();
        store.create(&live).await.unwrap();

        assert_eq!(store.deactivate_expired(now).await.unwrap(), 1);
        let kept = store.find_by_id(expired.id).await.unwrap().unwrap();
        assert!(!kept.is_active);
        assert!(store.find_by_id(live.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn reclaim_only_moves_stale_sent_records() {
        let store = MemoryNotificationStore::new();
        let user = Uuid::new_v4();
        let sent = insert_with_status(&store, user, NotificationStatus::Sent).await;
        let delivered = insert_with_status(&store, user, NotificationStatus::Delivered).await;
        let pending = insert_with_status(&store, user, NotificationStatus::Pending).await;

        let now = Utc::now() + Duration::minutes(10);
        let stalled: Vec<Uuid> = store
            .find_stalled(now)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(stalled.len(), 2);
        assert!(stalled.contains(&sent) && stalled.contains(&pending));

        // Touched after the cutoff: a live pass, left alone.
        assert!(!store.reclaim_dispatch(sent, Utc::now() - Duration::minutes(10), now).await.unwrap());
        assert!(!store.reclaim_dispatch(delivered, now, now).await.unwrap());
        assert!(store.reclaim_dispatch(sent, now, now).await.unwrap());

        let reclaimed = store.find_by_id(sent).await.unwrap().unwrap();
        assert_eq!(reclaimed.status, NotificationStatus::Pending);
        assert_eq!(reclaimed.updated_at, now);
    }
}
