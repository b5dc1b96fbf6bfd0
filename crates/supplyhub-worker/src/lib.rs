//! Background processing for SupplyHub notifications.
//!
//! This crate provides:
//! - [`DispatchRunner`], which claims due dispatch tasks from the durable
//!   queue and hands them to the delivery orchestrator
//! - [`CronScheduler`], which runs the periodic jobs in [`jobs`]

pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use runner::DispatchRunner;
pub use scheduler::CronScheduler;
