//! # supplyhub-database
//!
//! Persistence for notifications and their dispatch queue. The
//! [`NotificationStore`] and [`DispatchQueue`] traits are implemented
//! twice: by PostgreSQL repositories and by in-memory maps used for
//! local runs and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod queue;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use queue::DispatchQueue;
pub use store::NotificationStore;
