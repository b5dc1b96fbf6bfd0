//! Channel delivery, retry backoff, and dispatch scheduling.

pub mod backoff;
pub mod channel;
pub mod orchestrator;
pub mod schedule;
pub mod senders;

pub use backoff::BackoffPolicy;
pub use channel::{ChannelError, ChannelRegistry, ChannelSender};
pub use orchestrator::{DeliveryOrchestrator, DispatchOutcome};
pub use schedule::DispatchScheduler;
pub use senders::{InAppSender, SimulatedSender, WebhookSender};
