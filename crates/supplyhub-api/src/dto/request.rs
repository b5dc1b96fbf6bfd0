//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use supplyhub_entity::notification::{NotificationFilter, NotificationStatus, NotificationType};

/// Query string for `GET /notifications`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotificationsQuery {
    /// Recipient filter; honoured for admins only.
    pub user_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
}

impl ListNotificationsQuery {
    pub fn into_filter(self) -> NotificationFilter {
        NotificationFilter {
            user_id: self.user_id,
            vendor_id: self.vendor_id,
            notification_type: self.notification_type,
            statuses: self.status.into_iter().collect(),
        }
    }
}

/// Query string for `GET /notifications/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    /// Admins may ask for another user's counts, or `all=true` for every user.
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub all: bool,
}

/// Body for `POST /notifications/send-order-status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendOrderStatusRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "order_id is required"))]
    pub order_id: String,
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
    #[serde(default)]
    pub vendor_id: Option<Uuid>,
}

/// Body for `POST /notifications/send-payment`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendPaymentRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "payment_id is required"))]
    pub payment_id: String,
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: f64,
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
    #[serde(default)]
    pub vendor_id: Option<Uuid>,
}

/// Body for `POST /notifications/send-forecast`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendForecastRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "forecast_id is required"))]
    pub forecast_id: String,
    #[validate(length(min = 1, message = "forecast_type is required"))]
    pub forecast_type: String,
    #[serde(default)]
    pub vendor_id: Option<Uuid>,
}
