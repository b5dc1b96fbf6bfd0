//! Notification creation, queries, read state, and business templates.

pub mod service;
pub mod templates;

pub use service::NotificationService;
