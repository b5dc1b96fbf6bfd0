//! Durable dispatch tasks.
//!
//! A task says "run a dispatch pass for notification X no earlier than T".
//! Initial sends, scheduled sends, and backoff retries are all tasks, so
//! pending work survives a restart.

pub mod model;
pub mod status;

pub use model::{DispatchTask, NewDispatchTask};
pub use status::{DispatchKind, DispatchStatus};
