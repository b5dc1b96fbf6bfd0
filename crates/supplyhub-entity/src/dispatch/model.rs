//! Dispatch task entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{DispatchKind, DispatchStatus};

/// A queued dispatch pass.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DispatchTask {
    pub id: Uuid,
    pub notification_id: Uuid,
    pub kind: DispatchKind,
    /// Pass number: 0 for the first pass, `retry_count` for retries.
    pub attempt: i32,
    /// Earliest time the task may be claimed.
    pub run_at: DateTime<Utc>,
    pub status: DispatchStatus,
    /// Worker that claimed the task.
    pub worker_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to enqueue a dispatch task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDispatchTask {
    pub notification_id: Uuid,
    pub kind: DispatchKind,
    pub attempt: i32,
    pub run_at: DateTime<Utc>,
}

impl NewDispatchTask {
    pub fn initial(notification_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            notification_id,
            kind: DispatchKind::Initial,
            attempt: 0,
            run_at: now,
        }
    }

    pub fn scheduled(notification_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            notification_id,
            kind: DispatchKind::Scheduled,
            attempt: 0,
            run_at: at,
        }
    }

    pub fn retry(notification_id: Uuid, attempt: i32, at: DateTime<Utc>) -> Self {
        Self {
            notification_id,
            kind: DispatchKind::Retry,
            attempt,
            run_at: at,
        }
    }

    /// Materialize as a PENDING task row.
    pub fn into_task(self, now: DateTime<Utc>) -> DispatchTask {
        DispatchTask {
            id: Uuid::new_v4(),
            notification_id: self.notification_id,
            kind: self.kind,
            attempt: self.attempt,
            run_at: self.run_at,
            status: DispatchStatus::Pending,
            worker_id: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
