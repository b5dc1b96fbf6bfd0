//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let mut healthy = true;
    let mut database_latency_ms = None;

    let backend = match &state.db_pool {
        Some(pool) => {
            match pool.ping().await {
                Ok(latency) => database_latency_ms = Some(latency.as_millis() as u64),
                Err(e) => {
                    tracing::warn!(error = %e, "Health check could not reach the database");
                    healthy = false;
                }
            }
            "postgres"
        }
        None => "memory",
    };

    let pending_dispatches = match state.dispatch_queue.pending_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read dispatch queue");
            healthy = false;
            None
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        backend: backend.to_string(),
        database_latency_ms,
        pending_dispatches,
    }))
}
