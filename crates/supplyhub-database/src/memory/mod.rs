//! In-memory implementations of the store traits.

pub mod dispatch;
pub mod notification;

pub use dispatch::MemoryDispatchQueue;
pub use notification::MemoryNotificationStore;
