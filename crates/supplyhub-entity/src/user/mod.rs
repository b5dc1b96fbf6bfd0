//! Platform user roles as carried in access tokens.

pub mod role;

pub use role::UserRole;
