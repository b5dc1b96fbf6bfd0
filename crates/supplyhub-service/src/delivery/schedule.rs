//! Enqueueing dispatch passes.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::debug;

use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::DispatchQueue;
use supplyhub_entity::dispatch::{DispatchTask, NewDispatchTask};

/// Writes dispatch tasks to the durable queue and wakes the runner.
pub struct DispatchScheduler {
    queue: Arc<dyn DispatchQueue>,
    clock: Arc<dyn Clock>,
    wake: Arc<Notify>,
}

impl DispatchScheduler {
    pub fn new(queue: Arc<dyn DispatchQueue>, clock: Arc<dyn Clock>) -> Self {
        Self {
            queue,
            clock,
            wake: Arc::new(Notify::new()),
        }
    }

    pub async fn schedule(&self, task: NewDispatchTask) -> AppResult<DispatchTask> {
        let task = self.queue.enqueue(task, self.clock.now()).await?;
        debug!(
            task_id = %task.id,
            notification_id = %task.notification_id,
            kind = %task.kind,
            run_at = %task.run_at,
            "Dispatch task enqueued"
        );
        self.wake.notify_one();
        Ok(task)
    }

    /// Signalled whenever a task is enqueued.
    pub fn wake_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    pub fn queue(&self) -> &Arc<dyn DispatchQueue> {
        &self.queue
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
