//! # supplyhub-api
//!
//! HTTP API layer for SupplyHub notifications built on Axum.
//!
//! Provides the REST endpoints, middleware (auth, RBAC, CORS, logging),
//! extractors, DTOs, error mapping, and the process wiring that connects
//! the store, delivery orchestrator, and background worker.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{AppComponents, build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
