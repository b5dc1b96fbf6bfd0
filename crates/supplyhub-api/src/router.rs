//! Route definitions for the SupplyHub notification API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route, without the outer layers.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Inbox queries, read transitions, and admin templates
fn notification_routes() -> Router<AppState> {
    use handlers::notification as h;

    Router::new()
        .route("/notifications", get(h::list_notifications))
        .route("/notifications/stats", get(h::stats))
        .route("/notifications/unread", get(h::unread))
        .route("/notifications/mark-all-read", patch(h::mark_all_read))
        .route("/notifications/send-order-status", post(h::send_order_status))
        .route("/notifications/send-payment", post(h::send_payment))
        .route("/notifications/send-forecast", post(h::send_forecast))
        .route(
            "/notifications/{id}",
            get(h::get_notification).delete(h::delete_notification),
        )
        .route("/notifications/{id}/read", patch(h::mark_read))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
