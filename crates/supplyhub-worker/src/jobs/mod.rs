//! Periodic jobs run by the cron scheduler.

pub mod expiry;
pub mod maintenance;

use async_trait::async_trait;

use supplyhub_core::result::AppResult;

pub use expiry::ExpirySweepJob;
pub use maintenance::QueueMaintenanceJob;

/// A unit of periodic work.
#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Runs once and returns the number of rows touched.
    async fn run(&self) -> AppResult<u64>;
}
