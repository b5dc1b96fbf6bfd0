//! PostgreSQL repository implementations.

pub mod dispatch;
pub mod notification;

pub use dispatch::DispatchTaskRepository;
pub use notification::NotificationRepository;
