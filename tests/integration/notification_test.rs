//! Integration tests for the notification HTTP API.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use supplyhub_entity::user::UserRole;

use helpers::TestApp;

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["backend"], "memory");
    assert_eq!(response.body["data"]["pending_dispatches"], 0);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/notifications", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");

    let response = app
        .request("GET", "/api/notifications", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn order_status_is_delivered_by_worker() {
    let app = TestApp::new();
    let vendor = Uuid::new_v4();
    let id = app.send_order_status(vendor, "shipped").await;

    let token = app.token(vendor, UserRole::Vendor);
    let path = format!("/api/notifications/{id}");

    let before = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["data"]["status"], "pending");
    assert_eq!(before.body["data"]["type"], "order_status");
    assert_eq!(before.body["data"]["channels"], json!(["in_app", "email"]));

    assert_eq!(app.deliver_due().await, 1);

    let after = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(after.body["data"]["status"], "delivered");
    let attempts = after.body["data"]["delivery_attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().all(|a| a["status"] == "success"));
}

#[tokio::test]
async fn only_admins_send_templates() {
    let app = TestApp::new();
    let token = app.token(Uuid::new_v4(), UserRole::Vendor);

    let response = app
        .request(
            "POST",
            "/api/notifications/send-payment",
            Some(json!({
                "user_id": Uuid::new_v4(),
                "payment_id": "PAY-1",
                "amount": 10.0,
                "status": "completed",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "AUTHORIZATION");
}

#[tokio::test]
async fn template_body_is_validated() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/notifications/send-forecast",
            Some(json!({
                "user_id": Uuid::new_v4(),
                "forecast_id": "",
                "forecast_type": "demand",
            })),
            Some(&app.admin_token()),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn payment_template_sets_priority_and_message() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/notifications/send-payment",
            Some(json!({
                "user_id": Uuid::new_v4(),
                "payment_id": "PAY-77",
                "amount": 250.0,
                "status": "failed",
            })),
            Some(&app.admin_token()),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let data = &response.body["data"];
    assert_eq!(data["title"], "Payment failed");
    assert_eq!(data["message"], "Payment PAY-77 for $250 has been failed");
    assert_eq!(data["priority"], "high");
    assert_eq!(data["data"]["payment_id"], "PAY-77");
}

#[tokio::test]
async fn supplier_has_no_inbox_access() {
    let app = TestApp::new();
    let token = app.token(Uuid::new_v4(), UserRole::Supplier);
    let response = app
        .request("GET", "/api/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn vendor_sees_only_own_notifications() {
    let app = TestApp::new();
    let vendor = Uuid::new_v4();
    let other = Uuid::new_v4();
    let mine = app.send_order_status(vendor, "confirmed").await;
    let theirs = app.send_order_status(other, "confirmed").await;

    let token = app.token(vendor, UserRole::Vendor);
    let response = app
        .request(
            "GET",
            &format!("/api/notifications?user_id={other}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], mine);

    let foreign = app
        .request(
            "GET",
            &format!("/api/notifications/{theirs}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let admin = app
        .request(
            "GET",
            &format!("/api/notifications/{theirs}"),
            None,
            Some(&app.admin_token()),
        )
        .await;
    assert_eq!(admin.status, StatusCode::OK);
}

#[tokio::test]
async fn list_filters_by_status_and_type() {
    let app = TestApp::new();
    let vendor = Uuid::new_v4();
    app.send_order_status(vendor, "shipped").await;
    app.deliver_due().await;
    app.send_order_status(vendor, "packed").await;

    let token = app.token(vendor, UserRole::Vendor);
    let delivered = app
        .request(
            "GET",
            "/api/notifications?status=delivered&type=order_status",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(delivered.body["data"].as_array().unwrap().len(), 1);

    let payments = app
        .request("GET", "/api/notifications?type=payment", None, Some(&token))
        .await;
    assert!(payments.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn read_flow_updates_unread_and_stats() {
    let app = TestApp::new();
    let vendor = Uuid::new_v4();
    let token = app.token(vendor, UserRole::Vendor);
    let first = app.send_order_status(vendor, "shipped").await;
    app.send_order_status(vendor, "delivered").await;
    app.deliver_due().await;

    let unread = app
        .request("GET", "/api/notifications/unread", None, Some(&token))
        .await;
    assert_eq!(unread.body["data"].as_array().unwrap().len(), 2);

    let path = format!("/api/notifications/{first}/read");
    let read = app.request("PATCH", &path, None, Some(&token)).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["data"]["status"], "read");
    let read_at = read.body["data"]["read_at"].clone();

    let again = app.request("PATCH", &path, None, Some(&token)).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["data"]["read_at"], read_at);

    let stats = app
        .request("GET", "/api/notifications/stats", None, Some(&token))
        .await;
    assert_eq!(
        stats.body["data"],
        json!({
            "total": 2,
            "delivered": 1,
            "awaiting_read": 1,
            "read": 1,
            "pending": 0,
            "failed": 0,
        })
    );

    let marked = app
        .request(
            "PATCH",
            "/api/notifications/mark-all-read",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(marked.body["data"]["marked"], 1);

    let unread = app
        .request("GET", "/api/notifications/unread", None, Some(&token))
        .await;
    assert!(unread.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn delete_then_missing() {
    let app = TestApp::new();
    let vendor = Uuid::new_v4();
    let token = app.token(vendor, UserRole::Vendor);
    let id = app.send_order_status(vendor, "cancelled").await;
    let path = format!("/api/notifications/{id}");

    let deleted = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["data"]["message"], "Notification deleted");

    let missing = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "NOT_FOUND");
    assert_eq!(missing.body["message"], "Notification not found");

    // The queued pass finds nothing to send.
    assert_eq!(app.deliver_due().await, 1);
}

#[tokio::test]
async fn forecast_template_records_forecast_kind() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/notifications/send-forecast",
            Some(json!({
                "user_id": Uuid::new_v4(),
                "forecast_id": "FC-12",
                "forecast_type": "supply",
            })),
            Some(&app.admin_token()),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let data = &response.body["data"]["data"];
    assert_eq!(data["forecast_id"], "FC-12");
    assert_eq!(data["type"], "supply");
    assert!(data.get("status").is_none());
}
