//! In-memory dispatch queue.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use supplyhub_core::result::AppResult;
use supplyhub_entity::dispatch::{DispatchStatus, DispatchTask, NewDispatchTask};

use crate::queue::DispatchQueue;

/// Process-local dispatch queue.
///
/// A single mutex guards the task table so a claim is one atomic step.
#[derive(Debug, Default)]
pub struct MemoryDispatchQueue {
    tasks: Mutex<HashMap<Uuid, DispatchTask>>,
}

impl MemoryDispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tasks<R>(&self, f: impl FnOnce(&mut HashMap<Uuid, DispatchTask>) -> R) -> R {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut tasks)
    }

    /// Snapshot of every task for a notification, oldest first.
    pub fn tasks_for(&self, notification_id: Uuid) -> Vec<DispatchTask> {
        let mut out: Vec<DispatchTask> = self.with_tasks(|tasks| {
            tasks
                .values()
                .filter(|t| t.notification_id == notification_id)
                .cloned()
                .collect()
        });
        out.sort_by_key(|t| (t.created_at, t.attempt));
        out
    }

    fn set_status(&self, id: Uuid, status: DispatchStatus, error: Option<&str>, now: DateTime<Utc>) {
        self.with_tasks(|tasks| {
            if let Some(task) = tasks.get_mut(&id) {
                task.status = status;
                task.error_message = error.map(str::to_string);
                task.updated_at = now;
            }
        });
    }
}

#[async_trait]
impl DispatchQueue for MemoryDispatchQueue {
    async fn enqueue(&self, task: NewDispatchTask, now: DateTime<Utc>) -> AppResult<DispatchTask> {
        let row = task.into_task(now);
        self.with_tasks(|tasks| tasks.insert(row.id, row.clone()));
        Ok(row)
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        worker_id: &str,
    ) -> AppResult<Vec<DispatchTask>> {
        Ok(self.with_tasks(|tasks| {
            let mut due: Vec<&mut DispatchTask> = tasks
                .values_mut()
                .filter(|t| t.status == DispatchStatus::Pending && t.run_at <= now)
                .collect();
            due.sort_by_key(|t| t.run_at);
            due.into_iter()
                .take(limit)
                .map(|t| {
                    t.status = DispatchStatus::Running;
                    t.worker_id = Some(worker_id.to_string());
                    t.updated_at = now;
                    t.clone()
                })
                .collect()
        }))
    }

    async fn complete(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.set_status(id, DispatchStatus::Completed, None, now);
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.set_status(id, DispatchStatus::Failed, Some(error), now);
        Ok(())
    }

    async fn requeue_stale(
        &self,
        claimed_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        Ok(self.with_tasks(|tasks| {
            let mut count = 0;
            for task in tasks.values_mut() {
                if task.status == DispatchStatus::Running && task.updated_at < claimed_before {
                    task.status = DispatchStatus::Pending;
                    task.worker_id = None;
                    task.updated_at = now;
                    count += 1;
                }
            }
            count
        }))
    }

    async fn purge_finished(&self, before: DateTime<Utc>) -> AppResult<u64> {
        Ok(self.with_tasks(|tasks| {
            let start = tasks.len();
            tasks.retain(|_, t| !(t.status.is_terminal() && t.updated_at < before));
            (start - tasks.len()) as u64
        }))
    }

    async fn has_live_task(&self, notification_id: Uuid) -> AppResult<bool> {
        Ok(self.with_tasks(|tasks| {
            tasks.values().any(|t| {
                t.notification_id == notification_id
                    && matches!(t.status, DispatchStatus::Pending | DispatchStatus::Running)
            })
        }))
    }

    async fn pending_count(&self) -> AppResult<i64> {
        Ok(self.with_tasks(|tasks| {
            tasks
                .values()
                .filter(|t| t.status == DispatchStatus::Pending)
                .count() as i64
        }))
    }

    async fn next_due_at(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.with_tasks(|tasks| {
            tasks
                .values()
                .filter(|t| t.status == DispatchStatus::Pending)
                .map(|t| t.run_at)
                .min()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn claims_only_due_tasks_in_run_order() {
        let queue = MemoryDispatchQueue::new();
        let now = Utc::now();
        let late = queue
            .enqueue(NewDispatchTask::retry(Uuid::new_v4(), 1, now + Duration::seconds(2)), now)
            .await
            .unwrap();
        let second = queue
            .enqueue(NewDispatchTask::initial(Uuid::new_v4(), now - Duration::seconds(1)), now)
            .await
            .unwrap();
        let first = queue
            .enqueue(NewDispatchTask::initial(Uuid::new_v4(), now - Duration::seconds(5)), now)
            .await
            .unwrap();

        let claimed = queue.claim_due(now, 10, "worker-a").await.unwrap();
        let ids: Vec<Uuid> = claimed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(claimed.iter().all(|t| t.status == DispatchStatus::Running));

        assert!(queue.claim_due(now, 10, "worker-b").await.unwrap().is_empty());
        assert_eq!(queue.next_due_at().await.unwrap(), Some(late.run_at));
    }

    #[tokio::test]
    async fn stale_running_tasks_are_requeued() {
        let queue = MemoryDispatchQueue::new();
        let t0 = Utc::now();
        queue
            .enqueue(NewDispatchTask::initial(Uuid::new_v4(), t0), t0)
            .await
            .unwrap();
        queue.claim_due(t0, 1, "crashed").await.unwrap();
        assert_eq!(queue.pending_count().await.unwrap(), 0);

        let later = t0 + Duration::minutes(10);
        let requeued = queue
            .requeue_stale(later - Duration::minutes(5), later)
            .await
            .unwrap();
        assert_eq!(requeued, 1);
        assert_eq!(queue.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn purge_keeps_pending_and_recent() {
        let queue = MemoryDispatchQueue::new();
        let t0 = Utc::now();
        let done = queue
            .enqueue(NewDispatchTask::initial(Uuid::new_v4(), t0), t0)
            .await
            .unwrap();
        queue
            .enqueue(NewDispatchTask::initial(Uuid::new_v4(), t0), t0)
            .await
            .unwrap();
        queue.complete(done.id, t0).await.unwrap();

        let purged = queue.purge_finished(t0 + Duration::days(8)).await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(queue.pending_count().await.unwrap(), 1);
    }
}
