//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use supplyhub_auth::jwt::JwtDecoder;
use supplyhub_core::config::AppConfig;
use supplyhub_database::{DatabasePool, DispatchQueue};
use supplyhub_service::NotificationService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool; `None` on the in-memory backend
    pub db_pool: Option<DatabasePool>,
    /// Dispatch queue, read by the health endpoint
    pub dispatch_queue: Arc<dyn DispatchQueue>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Notification service
    pub notification_service: Arc<NotificationService>,
    pub started_at: Instant,
}
