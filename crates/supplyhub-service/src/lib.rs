//! # supplyhub-service
//!
//! Business logic for notifications. [`NotificationService`] owns creation,
//! queries, and read-state transitions; [`DeliveryOrchestrator`] drives a
//! notification through its channels and decides retries.
//!
//! Services follow constructor injection: every dependency is provided at
//! construction time as an `Arc`.

pub mod context;
pub mod delivery;
pub mod notification;

pub use context::RequestContext;
pub use delivery::{
    BackoffPolicy, ChannelError, ChannelRegistry, ChannelSender, DeliveryOrchestrator,
    DispatchOutcome, DispatchScheduler,
};
pub use notification::NotificationService;
