//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use supplyhub_core::error::AppError;
use supplyhub_entity::notification::{Notification, NotificationStats};

use crate::dto::request::{
    ListNotificationsQuery, SendForecastRequest, SendOrderStatusRequest, SendPaymentRequest,
    StatsQuery,
};
use crate::dto::response::{ApiResponse, MarkedResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::{require_admin, require_inbox_access};
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn validate(body: &impl Validate) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> ApiResult<Vec<Notification>> {
    require_inbox_access(&auth)?;
    let items = state
        .notification_service
        .list_for(&auth, query.into_filter())
        .await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/notifications/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<StatsQuery>,
) -> ApiResult<NotificationStats> {
    require_inbox_access(&auth)?;
    let scope = if !auth.is_admin() {
        Some(auth.user_id)
    } else if query.all {
        None
    } else {
        Some(query.user_id.unwrap_or(auth.user_id))
    };
    let stats = state.notification_service.get_stats(scope).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/notifications/unread
pub async fn unread(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<Notification>> {
    require_inbox_access(&auth)?;
    let items = state.notification_service.unread(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/notifications/{id}
pub async fn get_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Notification> {
    require_inbox_access(&auth)?;
    let notification = state.notification_service.find_one_for(&auth, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Notification> {
    require_inbox_access(&auth)?;
    let notification = state.notification_service.mark_as_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PATCH /api/notifications/mark-all-read
pub async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> ApiResult<MarkedResponse> {
    require_inbox_access(&auth)?;
    let marked = state
        .notification_service
        .mark_all_as_read(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    require_inbox_access(&auth)?;
    state.notification_service.remove(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Notification deleted",
    ))))
}

/// POST /api/notifications/send-order-status
pub async fn send_order_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendOrderStatusRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    require_admin(&auth)?;
    validate(&req)?;
    let notification = state
        .notification_service
        .send_order_status_notification(&auth, req.user_id, &req.order_id, &req.status, req.vendor_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notification))))
}

/// POST /api/notifications/send-payment
pub async fn send_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    require_admin(&auth)?;
    validate(&req)?;
    let notification = state
        .notification_service
        .send_payment_notification(
            &auth,
            req.user_id,
            &req.payment_id,
            req.amount,
            &req.status,
            req.vendor_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notification))))
}

/// POST /api/notifications/send-forecast
pub async fn send_forecast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendForecastRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    require_admin(&auth)?;
    validate(&req)?;
    let notification = state
        .notification_service
        .send_forecast_notification(
            &auth,
            req.user_id,
            &req.forecast_id,
            &req.forecast_type,
            req.vendor_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notification))))
}
