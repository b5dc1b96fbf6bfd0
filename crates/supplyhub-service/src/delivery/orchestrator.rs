//! Delivery state machine.
//!
//! One call to [`DeliveryOrchestrator::send_notification`] is one dispatch
//! pass: claim the PENDING record, attempt its channels in order, record
//! every outcome, then settle on DELIVERED, a scheduled retry, or FAILED.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use supplyhub_core::config::{DeliveryConfig, RetryScope};
use supplyhub_core::error::AppError;
use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::NotificationStore;
use supplyhub_entity::dispatch::NewDispatchTask;
use supplyhub_entity::notification::{
    DeliveryAttempt, Notification, NotificationChannel, NotificationStatus,
};

use super::backoff::BackoffPolicy;
use super::channel::{ChannelError, ChannelRegistry};
use super::schedule::DispatchScheduler;

pub const MAX_RETRIES_EXCEEDED: &str = "Max retries exceeded";
pub const NOTIFICATION_EXPIRED: &str = "Notification expired";
pub const NOTIFICATION_INACTIVE: &str = "Notification inactive";

/// Result of one dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The record was not PENDING, or another writer moved it before the
    /// pass could settle.
    Skipped,
    Delivered,
    RetryScheduled {
        retry_count: i32,
        run_at: DateTime<Utc>,
    },
    Failed {
        reason: String,
    },
}

/// Drives notifications through their channels.
pub struct DeliveryOrchestrator {
    store: Arc<dyn NotificationStore>,
    channels: Arc<ChannelRegistry>,
    scheduler: Arc<DispatchScheduler>,
    clock: Arc<dyn Clock>,
    backoff: BackoffPolicy,
    retry_scope: RetryScope,
    channel_timeout: Duration,
}

impl DeliveryOrchestrator {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        channels: Arc<ChannelRegistry>,
        scheduler: Arc<DispatchScheduler>,
        clock: Arc<dyn Clock>,
        config: &DeliveryConfig,
    ) -> Self {
        Self {
            store,
            channels,
            scheduler,
            clock,
            backoff: BackoffPolicy::from_config(config),
            retry_scope: config.retry_scope,
            channel_timeout: config.channel_timeout(),
        }
    }

    /// Run one dispatch pass for `id`.
    ///
    /// Returns `NotFound` only when the record does not exist. Any other
    /// failure during the pass forces the record to FAILED and is reported
    /// as [`DispatchOutcome::Failed`].
    pub async fn send_notification(&self, id: Uuid) -> AppResult<DispatchOutcome> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))?;

        if current.status != NotificationStatus::Pending {
            debug!(notification_id = %id, status = %current.status, "Skipping dispatch");
            return Ok(DispatchOutcome::Skipped);
        }

        match self.run_pass(current).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(notification_id = %id, error = %e, "Dispatch pass failed");
                let reason = e.message;
                self.store.mark_failed(id, &reason, self.clock.now()).await?;
                Ok(DispatchOutcome::Failed { reason })
            }
        }
    }

    async fn run_pass(&self, current: Notification) -> AppResult<DispatchOutcome> {
        let id = current.id;

        if let Some(reason) = self.unsendable_reason(&current) {
            if !self.store.mark_failed(id, reason, self.clock.now()).await? {
                return Ok(self.superseded(id, "fail"));
            }
            info!(notification_id = %id, reason, "Notification not sent");
            return Ok(DispatchOutcome::Failed {
                reason: reason.to_string(),
            });
        }

        let Some(mut notification) = self.store.begin_dispatch(id, self.clock.now()).await? else {
            debug!(notification_id = %id, "Lost dispatch race");
            return Ok(DispatchOutcome::Skipped);
        };

        for channel in self.channels_to_attempt(&notification) {
            let attempt = self.attempt_channel(&notification, channel).await;
            self.store.append_attempt(id, &attempt).await?;
            notification.delivery_attempts.push(attempt);
        }

        let now = self.clock.now();
        if self.all_channels_satisfied(&notification) {
            if !self.store.mark_delivered(id, now).await? {
                return Ok(self.superseded(id, "deliver"));
            }
            info!(notification_id = %id, "Notification delivered");
            return Ok(DispatchOutcome::Delivered);
        }

        if notification.can_retry() {
            let retry_count = notification.retry_count + 1;
            let run_at = now + self.backoff.delay_for(retry_count);
            if !self.store.schedule_retry(id, retry_count, now).await? {
                return Ok(self.superseded(id, "retry"));
            }
            self.scheduler
                .schedule(NewDispatchTask::retry(id, retry_count, run_at))
                .await?;
            warn!(
                notification_id = %id,
                retry_count,
                max_retries = notification.max_retries,
                run_at = %run_at,
                "Delivery incomplete, retry scheduled"
            );
            return Ok(DispatchOutcome::RetryScheduled {
                retry_count,
                run_at,
            });
        }

        if !self.store.mark_failed(id, MAX_RETRIES_EXCEEDED, now).await? {
            return Ok(self.superseded(id, "fail"));
        }
        warn!(
            notification_id = %id,
            retry_count = notification.retry_count,
            "Delivery failed permanently"
        );
        Ok(DispatchOutcome::Failed {
            reason: MAX_RETRIES_EXCEEDED.to_string(),
        })
    }

    /// A read transition or delete changed the record mid-pass, so the
    /// settling write matched nothing.
    fn superseded(&self, id: Uuid, settle: &'static str) -> DispatchOutcome {
        debug!(notification_id = %id, settle, "Record changed during dispatch, leaving it as is");
        DispatchOutcome::Skipped
    }

    fn unsendable_reason(&self, notification: &Notification) -> Option<&'static str> {
        if !notification.is_active {
            Some(NOTIFICATION_INACTIVE)
        } else if notification.is_expired_at(self.clock.now()) {
            Some(NOTIFICATION_EXPIRED)
        } else {
            None
        }
    }

    fn channels_to_attempt(&self, notification: &Notification) -> Vec<NotificationChannel> {
        match self.retry_scope {
            RetryScope::AllChannels => notification.channels.clone(),
            RetryScope::FailedOnly => notification
                .channels
                .iter()
                .copied()
                .filter(|ch| !notification.has_succeeded_on(*ch))
                .collect(),
        }
    }

    fn all_channels_satisfied(&self, notification: &Notification) -> bool {
        notification.channels.iter().all(|ch| match self.retry_scope {
            RetryScope::FailedOnly => notification.has_succeeded_on(*ch),
            RetryScope::AllChannels => notification
                .latest_attempt(*ch)
                .is_some_and(|a| a.is_success()),
        })
    }

    async fn attempt_channel(
        &self,
        notification: &Notification,
        channel: NotificationChannel,
    ) -> DeliveryAttempt {
        let result = match self.channels.get(channel) {
            Some(sender) => {
                match tokio::time::timeout(self.channel_timeout, sender.send(notification)).await {
                    Ok(result) => result,
                    Err(_) => Err(ChannelError::Timeout(self.channel_timeout)),
                }
            }
            None => Err(ChannelError::Unsupported(channel)),
        };

        let at = self.clock.now();
        match result {
            Ok(()) => {
                debug!(notification_id = %notification.id, %channel, "Channel send succeeded");
                DeliveryAttempt::success(channel, at)
            }
            Err(e) => {
                warn!(notification_id = %notification.id, %channel, error = %e, "Channel send failed");
                DeliveryAttempt::failure(channel, at, e.to_string())
            }
        }
    }
}
