//! Notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use supplyhub_core::error::{AppError, ErrorKind};
use supplyhub_core::result::AppResult;
use supplyhub_entity::notification::{
    DeliveryAttempt, Notification, NotificationFilter, NotificationStats, UpdateNotification,
};

use crate::store::NotificationStore;

/// PostgreSQL-backed notification store.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, n: &Notification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, vendor_id, notification_type, priority, title, \
             message, data, channel, channels, status, retry_count, max_retries, delivery_attempts, \
             scheduled_at, is_active, expires_at, user_preferences, template, tags, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
             $18, $19, $20, $21, $22) RETURNING *",
        )
        .bind(n.id)
        .bind(n.user_id)
        .bind(n.vendor_id)
        .bind(n.notification_type)
        .bind(n.priority)
        .bind(&n.title)
        .bind(&n.message)
        .bind(n.data.as_ref().map(Json))
        .bind(n.channel)
        .bind(Json(&n.channels))
        .bind(n.status)
        .bind(n.retry_count)
        .bind(n.max_retries)
        .bind(Json(&n.delivery_attempts))
        .bind(n.scheduled_at)
        .bind(n.is_active)
        .bind(n.expires_at)
        .bind(n.user_preferences.as_ref().map(Json))
        .bind(n.template.as_ref().map(Json))
        .bind(&n.tags)
        .bind(n.created_at)
        .bind(n.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create notification"))
    }

    async fn find_all(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>> {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
             AND ($2::uuid IS NULL OR vendor_id = $2) \
             AND ($3::text IS NULL OR notification_type::text = $3) \
             AND (cardinality($4::text[]) = 0 OR status::text = ANY($4)) \
             ORDER BY created_at DESC",
        )
        .bind(filter.user_id)
        .bind(filter.vendor_id)
        .bind(filter.notification_type.map(|t| t.as_str()))
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list notifications"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find notification"))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &UpdateNotification,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET \
             priority = COALESCE($2, priority), \
             title = COALESCE($3, title), \
             message = COALESCE($4, message), \
             data = COALESCE($5, data), \
             scheduled_at = COALESCE($6, scheduled_at), \
             expires_at = COALESCE($7, expires_at), \
             is_active = COALESCE($8, is_active), \
             tags = COALESCE($9, tags), \
             updated_at = $10 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.priority)
        .bind(patch.title.as_deref())
        .bind(patch.message.as_deref())
        .bind(patch.data.as_ref().map(Json))
        .bind(patch.scheduled_at)
        .bind(patch.expires_at)
        .bind(patch.is_active)
        .bind(patch.tags.as_ref())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update notification"))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete notification"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin_dispatch(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET status = 'sent', sent_at = COALESCE(sent_at, $2), updated_at = $2 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to begin dispatch"))
    }

    async fn append_attempt(&self, id: Uuid, attempt: &DeliveryAttempt) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET delivery_attempts = delivery_attempts || $2::jsonb, \
             updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(Json([attempt]))
        .bind(attempt.timestamp)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to record delivery attempt"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_delivered(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'delivered', delivered_at = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'sent'",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark notification delivered"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        retry_count: i32,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'pending', retry_count = $2, updated_at = $3 \
             WHERE id = $1 AND status = 'sent' AND $2 <= max_retries",
        )
        .bind(id)
        .bind(retry_count)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to schedule notification retry"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reclaim_dispatch(
        &self,
        id: Uuid,
        updated_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'pending', updated_at = $3 \
             WHERE id = $1 AND status = 'sent' AND updated_at < $2",
        )
        .bind(id)
        .bind(updated_before)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to reclaim abandoned dispatch"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_stalled(&self, updated_before: DateTime<Utc>) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE is_active AND status IN ('pending', 'sent') \
             AND updated_at < $1 ORDER BY updated_at",
        )
        .bind(updated_before)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find stalled notifications"))
    }

    async fn mark_failed(&self, id: Uuid, reason: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'failed', failed_at = $3, failure_reason = $2, \
             updated_at = $3 WHERE id = $1 AND status IN ('pending', 'sent')",
        )
        .bind(id)
        .bind(reason)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark notification failed"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_read(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET status = 'read', read_at = COALESCE(read_at, $2), updated_at = $2 \
             WHERE id = $1 AND status <> 'failed' RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to mark notification read"))
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read', read_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND status IN ('sent', 'delivered')",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark notifications read"))?;
        Ok(result.rows_affected())
    }

    async fn stats(&self, user_id: Option<Uuid>) -> AppResult<NotificationStats> {
        sqlx::query_as::<_, NotificationStats>(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE status = 'delivered') AS delivered, \
             COUNT(*) FILTER (WHERE status IN ('sent', 'delivered')) AS awaiting_read, \
             COUNT(*) FILTER (WHERE status = 'read') AS read, \
             COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
             COUNT(*) FILTER (WHERE status = 'failed') AS failed \
             FROM notifications WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to compute notification stats"))
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_active = FALSE, updated_at = $1 \
             WHERE is_active AND expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to deactivate expired notifications"))?;
        Ok(result.rows_affected())
    }
}
