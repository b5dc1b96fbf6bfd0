//! # supplyhub-entity
//!
//! Domain entity models for the SupplyHub notification service. Every
//! struct in this crate represents a database table row or a domain value
//! object. Row types additionally derive `sqlx::FromRow`.

pub mod dispatch;
pub mod notification;
pub mod user;
