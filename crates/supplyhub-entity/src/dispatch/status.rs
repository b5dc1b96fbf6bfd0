//! Dispatch task enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a dispatch task exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "dispatch_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DispatchKind {
    /// First pass, due immediately after creation.
    Initial,
    /// First pass, deferred to the notification's `scheduled_at`.
    Scheduled,
    /// A backoff retry.
    Retry,
}

impl DispatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Scheduled => "scheduled",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing state of a dispatch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "dispatch_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    /// Waiting for `run_at`.
    Pending,
    /// Claimed by a worker.
    Running,
    /// The dispatch pass ran.
    Completed,
    /// The pass could not run (for example, the notification was deleted).
    Failed,
}

impl DispatchStatus {
    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
