//! # supplyhub-core
//!
//! Core crate for the SupplyHub notification service. Contains the
//! configuration schema, the clock abstraction used by time-dependent
//! logic, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SupplyHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
