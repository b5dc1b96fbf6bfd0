//! Notification domain entities.

pub mod attempt;
pub mod model;
pub mod payload;
pub mod status;

pub use attempt::{AttemptStatus, DeliveryAttempt};
pub use model::{
    CreateNotification, Notification, NotificationFilter, NotificationStats, UpdateNotification,
};
pub use payload::{NotificationData, NotificationTemplate, QuietHours, UserPreferences};
pub use status::{NotificationChannel, NotificationPriority, NotificationStatus, NotificationType};
