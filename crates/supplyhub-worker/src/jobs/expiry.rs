//! Soft expiry of notifications past `expires_at`.

use std::sync::Arc;

use async_trait::async_trait;

use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::NotificationStore;

use super::PeriodicJob;

/// Flips `is_active` off for every expired notification. Rows are kept so
/// history and stats stay intact.
pub struct ExpirySweepJob {
    store: Arc<dyn NotificationStore>,
    clock: Arc<dyn Clock>,
}

impl ExpirySweepJob {
    pub fn new(store: Arc<dyn NotificationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl PeriodicJob for ExpirySweepJob {
    fn name(&self) -> &'static str {
        "notification_expiry"
    }

    async fn run(&self) -> AppResult<u64> {
        let count = self.store.deactivate_expired(self.clock.now()).await?;
        if count > 0 {
            tracing::info!(count, "Deactivated expired notifications");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use supplyhub_core::traits::ManualClock;
    use supplyhub_database::memory::MemoryNotificationStore;
    use supplyhub_entity::notification::{
        CreateNotification, Notification, NotificationChannel, NotificationType,
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn deactivates_only_expired() {
        let store = Arc::new(MemoryNotificationStore::new());
        let clock = Arc::new(ManualClock::default());
        let mut input = CreateNotification::new(
            Uuid::new_v4(),
            NotificationType::System,
            NotificationChannel::InApp,
            "Maintenance window",
            "Portal is read-only tonight",
        );
        input.expires_at = Some(clock.now() + Duration::minutes(10));
        let n = store
            .create(&Notification::from_create(input, 3, clock.now()))
            .await
            .unwrap();

        let job = ExpirySweepJob::new(store.clone(), clock.clone());
        assert_eq!(job.run().await.unwrap(), 0);

        clock.advance(Duration::minutes(10));
        assert_eq!(job.run().await.unwrap(), 1);
        assert_eq!(job.run().await.unwrap(), 0);
        assert!(!store.find_by_id(n.id).await.unwrap().unwrap().is_active);
    }
}
