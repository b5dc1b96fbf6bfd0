//! Dispatch queue housekeeping.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use supplyhub_core::config::WorkerConfig;
use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::{DispatchQueue, NotificationStore};
use supplyhub_entity::dispatch::NewDispatchTask;
use supplyhub_entity::notification::NotificationStatus;

use super::PeriodicJob;

/// Recovers work abandoned by a crashed worker and purges old finished
/// tasks.
///
/// A record left SENT past the lease goes back to PENDING, and any PENDING
/// record without a live task gets a fresh one. Stale RUNNING tasks are
/// then returned to the queue.
pub struct QueueMaintenanceJob {
    queue: Arc<dyn DispatchQueue>,
    store: Arc<dyn NotificationStore>,
    clock: Arc<dyn Clock>,
    lease: Duration,
    retention: Duration,
}

impl QueueMaintenanceJob {
    pub fn new(
        queue: Arc<dyn DispatchQueue>,
        store: Arc<dyn NotificationStore>,
        clock: Arc<dyn Clock>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            queue,
            store,
            clock,
            lease: config.task_lease(),
            retention: Duration::days(i64::from(config.completed_retention_days)),
        }
    }

    async fn recover_stalled(&self, cutoff: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<u64> {
        let mut recovered = 0;
        for n in self.store.find_stalled(cutoff).await? {
            let reclaimed = n.status == NotificationStatus::Sent
                && self.store.reclaim_dispatch(n.id, cutoff, now).await?;
            if n.status == NotificationStatus::Sent && !reclaimed {
                continue;
            }

            let stranded = !self.queue.has_live_task(n.id).await?;
            if stranded {
                let run_at = n.scheduled_at.filter(|at| *at > now).unwrap_or(now);
                let task = if n.retry_count > 0 {
                    NewDispatchTask::retry(n.id, n.retry_count, run_at)
                } else {
                    NewDispatchTask::initial(n.id, run_at)
                };
                self.queue.enqueue(task, now).await?;
            }

            if reclaimed || stranded {
                tracing::warn!(
                    notification_id = %n.id,
                    reclaimed,
                    stranded,
                    "Recovered abandoned dispatch"
                );
                recovered += 1;
            }
        }
        Ok(recovered)
    }
}

#[async_trait]
impl PeriodicJob for QueueMaintenanceJob {
    fn name(&self) -> &'static str {
        "dispatch_queue_maintenance"
    }

    async fn run(&self) -> AppResult<u64> {
        let now = self.clock.now();
        let cutoff = now - self.lease;
        let recovered = self.recover_stalled(cutoff, now).await?;
        let requeued = self.queue.requeue_stale(cutoff, now).await?;
        let purged = self.queue.purge_finished(now - self.retention).await?;

        if requeued > 0 {
            tracing::warn!(requeued, "Re-queued stale dispatch tasks");
        }
        tracing::debug!(purged, recovered, "Dispatch queue maintenance finished");
        Ok(recovered + requeued + purged)
    }
}
