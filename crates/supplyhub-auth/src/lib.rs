//! # supplyhub-auth
//!
//! Authentication and authorization for the notification service.
//!
//! ## Modules
//!
//! - `jwt`: access token claims, validation, and minting
//! - `rbac`: which roles may perform which notification operations

pub mod jwt;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use rbac::{NotificationPermission, RbacEnforcer};
