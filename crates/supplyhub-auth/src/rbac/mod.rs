//! Role-based access control for notification operations.

pub mod enforcer;

pub use enforcer::{NotificationPermission, RbacEnforcer};
