//! Cron scheduler for periodic maintenance jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use supplyhub_core::error::AppError;

use crate::jobs::PeriodicJob;

/// Runs [`PeriodicJob`]s on cron expressions (six fields, seconds first).
pub struct CronScheduler {
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self { scheduler })
    }

    /// Registers `job` to run on `schedule`. Failures inside a run are
    /// logged and do not unschedule the job.
    pub async fn register(&self, schedule: &str, job: Arc<dyn PeriodicJob>) -> Result<(), AppError> {
        let name = job.name();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                tracing::debug!(job = job.name(), "Running periodic job");
                match job.run().await {
                    Ok(touched) => tracing::debug!(job = job.name(), touched, "Periodic job finished"),
                    Err(e) => tracing::error!(job = job.name(), error = %e, "Periodic job failed"),
                }
            })
        })
        .map_err(|e| AppError::configuration(format!("Invalid schedule '{schedule}' for {name}: {e}")))?;

        self.scheduler
            .add(cron)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(job = name, schedule, "Registered periodic job");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        tracing::info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
