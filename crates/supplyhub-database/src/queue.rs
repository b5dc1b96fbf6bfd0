//! Dispatch task queue interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use supplyhub_core::result::AppResult;
use supplyhub_entity::dispatch::{DispatchTask, NewDispatchTask};

/// Durable queue of dispatch passes.
#[async_trait]
pub trait DispatchQueue: Send + Sync + 'static {
    async fn enqueue(&self, task: NewDispatchTask, now: DateTime<Utc>) -> AppResult<DispatchTask>;

    /// Claim up to `limit` PENDING tasks with `run_at <= now`, oldest due
    /// first, marking them RUNNING for `worker_id`. Concurrent claimers
    /// never receive the same task.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        worker_id: &str,
    ) -> AppResult<Vec<DispatchTask>>;

    async fn complete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()>;

    async fn fail(&self, id: Uuid, error: &str, now: DateTime<Utc>) -> AppResult<()>;

    /// Return RUNNING tasks last touched before `claimed_before` to PENDING.
    async fn requeue_stale(
        &self,
        claimed_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Delete COMPLETED and FAILED tasks last touched before `before`.
    async fn purge_finished(&self, before: DateTime<Utc>) -> AppResult<u64>;

    /// Whether `notification_id` has a PENDING or RUNNING task.
    async fn has_live_task(&self, notification_id: Uuid) -> AppResult<bool>;

    /// Number of PENDING tasks, due or not.
    async fn pending_count(&self) -> AppResult<i64>;

    /// Earliest `run_at` among PENDING tasks.
    async fn next_due_at(&self) -> AppResult<Option<DateTime<Utc>>>;
}
