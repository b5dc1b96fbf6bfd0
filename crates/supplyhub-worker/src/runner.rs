//! Dispatch runner: claims due tasks and runs delivery passes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, Semaphore, watch};
use tokio::time;

use supplyhub_core::config::WorkerConfig;
use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::DispatchQueue;
use supplyhub_entity::dispatch::DispatchTask;
use supplyhub_service::{DeliveryOrchestrator, DispatchOutcome};

/// Upper bound on how long shutdown waits for in-flight passes.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Polls the dispatch queue and executes passes with bounded concurrency.
pub struct DispatchRunner {
    queue: Arc<dyn DispatchQueue>,
    orchestrator: Arc<DeliveryOrchestrator>,
    clock: Arc<dyn Clock>,
    /// Signalled by the scheduler whenever a task is enqueued.
    wake: Arc<Notify>,
    config: WorkerConfig,
    worker_id: String,
}

impl std::fmt::Debug for DispatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRunner")
            .field("worker_id", &self.worker_id)
            .field("concurrency", &self.config.concurrency)
            .finish()
    }
}

impl DispatchRunner {
    pub fn new(
        queue: Arc<dyn DispatchQueue>,
        orchestrator: Arc<DeliveryOrchestrator>,
        clock: Arc<dyn Clock>,
        wake: Arc<Notify>,
        config: WorkerConfig,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            orchestrator,
            clock,
            wake,
            config,
            worker_id: worker_id.into(),
        }
    }

    /// Runs until the cancel signal flips to `true`, then waits for
    /// in-flight passes to finish.
    pub async fn run(self: Arc<Self>, mut cancel: watch::Receiver<bool>) {
        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            worker_id = %self.worker_id,
            concurrency,
            poll_interval_seconds = self.config.poll_interval_seconds,
            "Dispatch runner started"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));

        loop {
            if *cancel.borrow() {
                break;
            }

            if let Err(e) = Arc::clone(&self).dispatch_batch(&semaphore).await {
                tracing::error!(worker_id = %self.worker_id, error = %e, "Failed to claim dispatch tasks");
            }

            let idle = self.idle_duration().await;
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!(worker_id = %self.worker_id, "Dispatch runner received shutdown signal");
                        break;
                    }
                }
                _ = self.wake.notified() => {}
                _ = time::sleep(idle) => {}
            }
        }

        tracing::info!(worker_id = %self.worker_id, "Waiting for in-flight dispatch passes");
        let permits = u32::try_from(concurrency).unwrap_or(u32::MAX);
        let _ = time::timeout(SHUTDOWN_DRAIN_TIMEOUT, semaphore.acquire_many(permits)).await;
        tracing::info!(worker_id = %self.worker_id, "Dispatch runner shut down");
    }

    /// Processes every task that is due now, one at a time, and returns
    /// how many were handled. Tasks that become due while draining (a
    /// zero-delay retry, for example) are picked up too.
    pub async fn drain_due(&self) -> AppResult<usize> {
        let mut handled = 0;
        loop {
            let batch = self
                .queue
                .claim_due(self.clock.now(), self.config.batch_size.max(1), &self.worker_id)
                .await?;
            if batch.is_empty() {
                return Ok(handled);
            }
            for task in batch {
                self.process(task).await;
                handled += 1;
            }
        }
    }

    /// Claims as many due tasks as there are free slots and spawns them.
    async fn dispatch_batch(self: Arc<Self>, semaphore: &Arc<Semaphore>) -> AppResult<()> {
        let free = semaphore.available_permits().min(self.config.batch_size.max(1));
        if free == 0 {
            tracing::trace!(worker_id = %self.worker_id, "All dispatch slots occupied");
            return Ok(());
        }

        let tasks = self
            .queue
            .claim_due(self.clock.now(), free, &self.worker_id)
            .await?;

        for task in tasks {
            let Ok(permit) = Arc::clone(semaphore).acquire_owned().await else {
                break;
            };
            let runner = Arc::clone(&self);
            tokio::spawn(async move {
                let _permit = permit;
                runner.process(task).await;
            });
        }
        Ok(())
    }

    /// How long to sleep before polling again: until the next task is due,
    /// but never longer than the poll interval.
    async fn idle_duration(&self) -> Duration {
        let poll = Duration::from_secs(self.config.poll_interval_seconds.max(1));
        match self.queue.next_due_at().await {
            Ok(Some(due)) => (due - self.clock.now()).to_std().unwrap_or(Duration::ZERO).min(poll),
            Ok(None) => poll,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read next due time");
                poll
            }
        }
    }

    async fn process(&self, task: DispatchTask) {
        tracing::debug!(
            task_id = %task.id,
            notification_id = %task.notification_id,
            kind = %task.kind,
            attempt = task.attempt,
            "Processing dispatch task"
        );

        let result = match self.orchestrator.send_notification(task.notification_id).await {
            Ok(outcome) => {
                if let DispatchOutcome::Failed { reason } = &outcome {
                    tracing::info!(notification_id = %task.notification_id, reason = %reason, "Notification failed");
                }
                self.queue.complete(task.id, self.clock.now()).await
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    task_id = %task.id,
                    notification_id = %task.notification_id,
                    "Notification vanished before dispatch"
                );
                self.queue
                    .fail(task.id, "Notification not found", self.clock.now())
                    .await
            }
            Err(e) => {
                tracing::error!(task_id = %task.id, error = %e, "Dispatch task failed");
                self.queue.fail(task.id, &e.message, self.clock.now()).await
            }
        };

        if let Err(e) = result {
            tracing::error!(task_id = %task.id, error = %e, "Failed to settle dispatch task");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use supplyhub_auth::rbac::RbacEnforcer;
    use supplyhub_core::config::DeliveryConfig;
    use supplyhub_core::traits::{ManualClock, SystemClock};
    use supplyhub_database::NotificationStore;
    use supplyhub_database::memory::{MemoryDispatchQueue, MemoryNotificationStore};
    use supplyhub_entity::dispatch::DispatchStatus;
    use supplyhub_entity::notification::{
        CreateNotification, NotificationChannel, NotificationStatus, NotificationType,
    };
    use supplyhub_service::delivery::InAppSender;
    use supplyhub_service::{ChannelRegistry, DispatchScheduler, NotificationService};
    use uuid::Uuid;

    use crate::jobs::{PeriodicJob, QueueMaintenanceJob};

    struct World {
        store: Arc<MemoryNotificationStore>,
        queue: Arc<MemoryDispatchQueue>,
        clock: Arc<ManualClock>,
        service: NotificationService,
        runner: DispatchRunner,
    }

    fn world() -> World {
        let store = Arc::new(MemoryNotificationStore::new());
        let queue = Arc::new(MemoryDispatchQueue::new());
        let clock = Arc::new(ManualClock::default());
        let scheduler = Arc::new(DispatchScheduler::new(queue.clone(), clock.clone()));

        let mut channels = ChannelRegistry::new();
        channels.register(Arc::new(InAppSender));
        let orchestrator = Arc::new(DeliveryOrchestrator::new(
            store.clone(),
            Arc::new(channels),
            scheduler.clone(),
            clock.clone(),
            &DeliveryConfig::default(),
        ));
        let service = NotificationService::new(
            store.clone(),
            scheduler.clone(),
            clock.clone(),
            Arc::new(RbacEnforcer::new()),
            3,
        );
        let runner = DispatchRunner::new(
            queue.clone(),
            orchestrator,
            clock.clone(),
            scheduler.wake_handle(),
            WorkerConfig::default(),
            "test-worker",
        );
        World {
            store,
            queue,
            clock,
            service,
            runner,
        }
    }

    fn create_input(channel: NotificationChannel) -> CreateNotification {
        CreateNotification::new(
            Uuid::new_v4(),
            NotificationType::Payment,
            channel,
            "Payment received",
            "Payment PAY-1 for $10 has been received",
        )
    }

    #[tokio::test]
    async fn drains_and_delivers_due_notification() {
        let w = world();
        let n = w
            .service
            .create(create_input(NotificationChannel::InApp))
            .await
            .unwrap();

        assert_eq!(w.runner.drain_due().await.unwrap(), 1);

        let stored = w.store.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Delivered);
        let tasks = w.queue.tasks_for(n.id);
        assert_eq!(tasks[0].status, DispatchStatus::Completed);
    }

    #[tokio::test]
    async fn retries_wait_for_backoff() {
        let w = world();
        // No SMS sender is registered, so every pass fails.
        let n = w
            .service
            .create(create_input(NotificationChannel::Sms))
            .await
            .unwrap();

        assert_eq!(w.runner.drain_due().await.unwrap(), 1);
        assert_eq!(w.runner.drain_due().await.unwrap(), 0);

        for delay in [2, 4, 8] {
            w.clock.advance(ChronoDuration::seconds(delay - 1));
            assert_eq!(w.runner.drain_due().await.unwrap(), 0);
            w.clock.advance(ChronoDuration::seconds(1));
            assert_eq!(w.runner.drain_due().await.unwrap(), 1);
        }

        let stored = w.store.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Failed);
        assert_eq!(stored.failure_reason.as_deref(), Some("Max retries exceeded"));
        assert_eq!(stored.delivery_attempts.len(), 4);
        assert_eq!(w.queue.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scheduled_notification_waits_until_due() {
        let w = world();
        let mut input = create_input(NotificationChannel::InApp);
        input.scheduled_at = Some(w.clock.now() + ChronoDuration::minutes(30));
        let n = w.service.create(input).await.unwrap();

        assert_eq!(w.runner.drain_due().await.unwrap(), 0);
        w.clock.advance(ChronoDuration::minutes(30));
        assert_eq!(w.runner.drain_due().await.unwrap(), 1);

        let stored = w.store.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Delivered);
    }

    #[tokio::test]
    async fn task_for_deleted_notification_is_failed() {
        let w = world();
        let n = w
            .service
            .create(create_input(NotificationChannel::InApp))
            .await
            .unwrap();
        w.store.delete(n.id).await.unwrap();

        assert_eq!(w.runner.drain_due().await.unwrap(), 1);
        let tasks = w.queue.tasks_for(n.id);
        assert_eq!(tasks[0].status, DispatchStatus::Failed);
        assert_eq!(tasks[0].error_message.as_deref(), Some("Notification not found"));
    }

    #[tokio::test]
    async fn run_loop_delivers_and_stops_on_cancel() {
        let store = Arc::new(MemoryNotificationStore::new());
        let queue = Arc::new(MemoryDispatchQueue::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let scheduler = Arc::new(DispatchScheduler::new(queue.clone(), clock.clone()));
        let mut channels = ChannelRegistry::new();
        channels.register(Arc::new(InAppSender));
        let orchestrator = Arc::new(DeliveryOrchestrator::new(
            store.clone(),
            Arc::new(channels),
            scheduler.clone(),
            clock.clone(),
            &DeliveryConfig::default(),
        ));
        let runner = Arc::new(DispatchRunner::new(
            queue.clone(),
            orchestrator,
            clock.clone(),
            scheduler.wake_handle(),
            WorkerConfig::default(),
            "loop-worker",
        ));
        let service = NotificationService::new(
            store.clone(),
            scheduler,
            clock,
            Arc::new(RbacEnforcer::new()),
            3,
        );

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(Arc::clone(&runner).run(cancel_rx));

        let n = service
            .create(create_input(NotificationChannel::InApp))
            .await
            .unwrap();

        let delivered = time::timeout(Duration::from_secs(5), async {
            loop {
                let status = store.find_by_id(n.id).await.unwrap().unwrap().status;
                if status == NotificationStatus::Delivered {
                    break;
                }
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(delivered.is_ok());

        cancel_tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    fn maintenance(w: &World) -> QueueMaintenanceJob {
        QueueMaintenanceJob::new(
            w.queue.clone(),
            w.store.clone(),
            w.clock.clone(),
            &WorkerConfig::default(),
        )
    }

    #[tokio::test]
    async fn worker_crash_mid_pass_is_recovered() {
        let w = world();
        let n = w
            .service
            .create(create_input(NotificationChannel::InApp))
            .await
            .unwrap();

        // A worker claims the task, starts the pass, then dies.
        let claimed = w.queue.claim_due(w.clock.now(), 10, "w1").await.unwrap();
        assert_eq!(claimed.len(), 1);
        w.store.begin_dispatch(n.id, w.clock.now()).await.unwrap().unwrap();

        w.clock.advance(ChronoDuration::seconds(301));
        maintenance(&w).run().await.unwrap();
        assert_eq!(
            w.store.find_by_id(n.id).await.unwrap().unwrap().status,
            NotificationStatus::Pending
        );

        assert_eq!(w.runner.drain_due().await.unwrap(), 1);
        let stored = w.store.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Delivered);
        assert_eq!(stored.delivery_attempts.len(), 1);
        assert_eq!(w.queue.tasks_for(n.id).len(), 1);
    }

    #[tokio::test]
    async fn pending_record_without_task_is_requeued() {
        let w = world();
        let n = w
            .service
            .create(create_input(NotificationChannel::InApp))
            .await
            .unwrap();

        // The pass scheduled a retry on the record but the retry task was
        // never written.
        let claimed = w.queue.claim_due(w.clock.now(), 10, "w1").await.unwrap();
        w.store.begin_dispatch(n.id, w.clock.now()).await.unwrap().unwrap();
        assert!(w.store.schedule_retry(n.id, 1, w.clock.now()).await.unwrap());
        w.queue.complete(claimed[0].id, w.clock.now()).await.unwrap();
        assert_eq!(w.runner.drain_due().await.unwrap(), 0);

        w.clock.advance(ChronoDuration::seconds(301));
        assert_eq!(maintenance(&w).run().await.unwrap(), 1);
        assert_eq!(w.runner.drain_due().await.unwrap(), 1);

        let stored = w.store.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Delivered);
        let tasks = w.queue.tasks_for(n.id);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].attempt, 1);
    }

    #[tokio::test]
    async fn waiting_notification_is_left_alone() {
        let w = world();
        let mut input = create_input(NotificationChannel::InApp);
        input.scheduled_at = Some(w.clock.now() + ChronoDuration::hours(2));
        let n = w.service.create(input).await.unwrap();

        w.clock.advance(ChronoDuration::seconds(301));
        assert_eq!(maintenance(&w).run().await.unwrap(), 0);
        assert_eq!(w.queue.tasks_for(n.id).len(), 1);
        assert_eq!(w.runner.drain_due().await.unwrap(), 0);
    }
}
