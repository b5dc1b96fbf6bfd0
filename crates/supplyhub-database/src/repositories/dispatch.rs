//! Dispatch task repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use supplyhub_core::error::{AppError, ErrorKind};
use supplyhub_core::result::AppResult;
use supplyhub_entity::dispatch::{DispatchTask, NewDispatchTask};

use crate::queue::DispatchQueue;

/// PostgreSQL-backed dispatch queue.
///
/// Claims use `FOR UPDATE SKIP LOCKED`, so several workers can poll the
/// same table without handing out a task twice.
#[derive(Debug, Clone)]
pub struct DispatchTaskRepository {
    pool: PgPool,
}

impl DispatchTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchQueue for DispatchTaskRepository {
    async fn enqueue(&self, task: NewDispatchTask, now: DateTime<Utc>) -> AppResult<DispatchTask> {
        let row = task.into_task(now);
        sqlx::query_as::<_, DispatchTask>(
            "INSERT INTO notification_dispatch_tasks \
             (id, notification_id, kind, attempt, run_at, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(row.id)
        .bind(row.notification_id)
        .bind(row.kind)
        .bind(row.attempt)
        .bind(row.run_at)
        .bind(row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue dispatch task", e))
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        worker_id: &str,
    ) -> AppResult<Vec<DispatchTask>> {
        let mut tasks = sqlx::query_as::<_, DispatchTask>(
            "UPDATE notification_dispatch_tasks SET status = 'running', worker_id = $3, updated_at = $1 \
             WHERE id IN ( \
                SELECT id FROM notification_dispatch_tasks \
                WHERE status = 'pending' AND run_at <= $1 \
                ORDER BY run_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT $2 \
             ) RETURNING *",
        )
        .bind(now)
        .bind(limit as i64)
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim dispatch tasks", e))?;

        // RETURNING does not preserve the subquery order.
        tasks.sort_by_key(|t| t.run_at);
        Ok(tasks)
    }

    async fn complete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE notification_dispatch_tasks SET status = 'completed', updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete dispatch task", e))?;
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE notification_dispatch_tasks SET status = 'failed', error_message = $2, updated_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark dispatch task failed", e))?;
        Ok(())
    }

    async fn requeue_stale(
        &self,
        claimed_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_dispatch_tasks SET status = 'pending', worker_id = NULL, updated_at = $2 \
             WHERE status = 'running' AND updated_at < $1",
        )
        .bind(claimed_before)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to requeue stale dispatch tasks", e))?;
        Ok(result.rows_affected())
    }

    async fn purge_finished(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notification_dispatch_tasks \
             WHERE status IN ('completed', 'failed') AND updated_at < $1",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge dispatch tasks", e))?;
        Ok(result.rows_affected())
    }

    async fn has_live_task(&self, notification_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM notification_dispatch_tasks \
             WHERE notification_id = $1 AND status IN ('pending', 'running'))",
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up dispatch tasks", e))
    }

    async fn pending_count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notification_dispatch_tasks WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count dispatch tasks", e))
    }

    async fn next_due_at(&self) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar("SELECT MIN(run_at) FROM notification_dispatch_tasks WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read next due time", e))
    }
}
