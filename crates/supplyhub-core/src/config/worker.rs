//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Longest task lease accepted from configuration (one day).
pub const MAX_TASK_LEASE_SECONDS: u64 = 24 * 60 * 60;

/// Dispatch worker and periodic maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the dispatch worker runs in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of dispatch tasks processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between queue polls when no wake-up arrives.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum number of due tasks claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Seconds a claimed task may stay `running` before it is re-queued.
    #[serde(default = "default_task_lease")]
    pub task_lease_seconds: u64,
    /// Days completed and failed tasks are retained.
    #[serde(default = "default_retention_days")]
    pub completed_retention_days: u32,
    /// Cron expression (with seconds) for the notification expiry sweep.
    #[serde(default = "default_expiry_cron")]
    pub expiry_sweep_cron: String,
    /// Cron expression (with seconds) for dispatch queue maintenance.
    #[serde(default = "default_maintenance_cron")]
    pub queue_maintenance_cron: String,
}

impl WorkerConfig {
    /// The task lease, clamped to [`MAX_TASK_LEASE_SECONDS`].
    pub fn task_lease(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.task_lease_seconds.min(MAX_TASK_LEASE_SECONDS) as i64)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            batch_size: default_batch_size(),
            task_lease_seconds: default_task_lease(),
            completed_retention_days: default_retention_days(),
            expiry_sweep_cron: default_expiry_cron(),
            queue_maintenance_cron: default_maintenance_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_poll_interval() -> u64 {
    5
}

fn default_batch_size() -> usize {
    16
}

fn default_task_lease() -> u64 {
    300
}

fn default_retention_days() -> u32 {
    7
}

fn default_expiry_cron() -> String {
    "0 */5 * * * *".to_string()
}

fn default_maintenance_cron() -> String {
    "0 */15 * * * *".to_string()
}
