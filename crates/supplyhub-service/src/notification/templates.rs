//! Canned notifications for order, payment, and forecast events.
//!
//! Each template fans out to in-app and email and records the business
//! identifiers in `data` so the frontend can deep-link.

use uuid::Uuid;

use supplyhub_auth::rbac::NotificationPermission;
use supplyhub_core::result::AppResult;
use supplyhub_entity::notification::{
    CreateNotification, Notification, NotificationChannel, NotificationData, NotificationPriority,
    NotificationType,
};

use super::service::NotificationService;
use crate::context::RequestContext;

const TEMPLATE_CHANNELS: [NotificationChannel; 2] =
    [NotificationChannel::InApp, NotificationChannel::Email];

impl NotificationService {
    pub async fn send_order_status_notification(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        order_id: &str,
        status: &str,
        vendor_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        self.rbac()
            .require_permission(ctx.role, NotificationPermission::Send)?;

        let priority = if matches!(status, "cancelled" | "rejected") {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        };
        let data = NotificationData {
            order_id: Some(order_id.to_string()),
            status: Some(status.to_string()),
            ..NotificationData::default()
        };
        let input = template_input(
            user_id,
            vendor_id,
            NotificationType::OrderStatus,
            priority,
            "Order Status Update".to_string(),
            format!("Your order {order_id} status has been updated to {status}"),
            data,
        );
        self.create(input).await
    }

    pub async fn send_payment_notification(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        payment_id: &str,
        amount: f64,
        status: &str,
        vendor_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        self.rbac()
            .require_permission(ctx.role, NotificationPermission::Send)?;

        let priority = if status == "failed" {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        };
        let data = NotificationData {
            payment_id: Some(payment_id.to_string()),
            amount: Some(amount),
            status: Some(status.to_string()),
            ..NotificationData::default()
        };
        let input = template_input(
            user_id,
            vendor_id,
            NotificationType::Payment,
            priority,
            format!("Payment {status}"),
            format!("Payment {payment_id} for ${amount} has been {status}"),
            data,
        );
        self.create(input).await
    }

    pub async fn send_forecast_notification(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        forecast_id: &str,
        forecast_type: &str,
        vendor_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        self.rbac()
            .require_permission(ctx.role, NotificationPermission::Send)?;

        let data = NotificationData {
            forecast_id: Some(forecast_id.to_string()),
            forecast_type: Some(forecast_type.to_string()),
            ..NotificationData::default()
        };
        let input = template_input(
            user_id,
            vendor_id,
            NotificationType::Forecast,
            NotificationPriority::Medium,
            "Forecast Ready".to_string(),
            format!("Your {forecast_type} forecast is ready for review"),
            data,
        );
        self.create(input).await
    }
}

fn template_input(
    user_id: Uuid,
    vendor_id: Option<Uuid>,
    notification_type: NotificationType,
    priority: NotificationPriority,
    title: String,
    message: String,
    data: NotificationData,
) -> CreateNotification {
    let mut input = CreateNotification::new(
        user_id,
        notification_type,
        NotificationChannel::InApp,
        title,
        message,
    );
    input.vendor_id = vendor_id;
    input.priority = Some(priority);
    input.channels = Some(TEMPLATE_CHANNELS.to_vec());
    input.data = Some(data);
    input
}
