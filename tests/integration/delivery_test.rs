//! End-to-end delivery tests: service create, durable queue, worker drain,
//! and retry backoff driven by the manual clock.

mod helpers;

use chrono::Duration;
use uuid::Uuid;

use supplyhub_core::traits::Clock;
use supplyhub_entity::notification::{
    CreateNotification, NotificationChannel, NotificationStatus, NotificationType,
};

use helpers::{TestApp, test_config};

fn input(user_id: Uuid, channels: Vec<NotificationChannel>) -> CreateNotification {
    let mut input = CreateNotification::new(
        user_id,
        NotificationType::System,
        NotificationChannel::InApp,
        "Maintenance window".to_string(),
        "The portal is read-only tonight".to_string(),
    );
    input.channels = Some(channels);
    input
}

/// Webhook sends fail: nothing listens on the discard port.
fn unreachable_webhook_app() -> TestApp {
    let mut config = test_config();
    config.delivery.webhook.url = Some("http://127.0.0.1:9/hook".to_string());
    config.delivery.webhook.timeout_seconds = 2;
    TestApp::with_config(config)
}

#[tokio::test]
async fn failing_channel_exhausts_retries() {
    let app = unreachable_webhook_app();
    let service = &app.components.state.notification_service;
    let created = service
        .create(input(
            Uuid::new_v4(),
            vec![NotificationChannel::InApp, NotificationChannel::Webhook],
        ))
        .await
        .unwrap();

    assert_eq!(app.deliver_due().await, 1);
    let after_first = service.find_one(created.id).await.unwrap();
    assert_eq!(after_first.status, NotificationStatus::Pending);
    assert_eq!(after_first.retry_count, 1);

    // Nothing is due before the backoff elapses.
    app.clock.advance(Duration::seconds(1));
    assert_eq!(app.deliver_due().await, 0);

    for wait in [1, 4, 8] {
        app.clock.advance(Duration::seconds(wait));
        assert_eq!(app.deliver_due().await, 1);
    }

    let done = service.find_one(created.id).await.unwrap();
    assert_eq!(done.status, NotificationStatus::Failed);
    assert_eq!(done.failure_reason.as_deref(), Some("Max retries exceeded"));
    assert_eq!(done.retry_count, 3);
    assert!(done.failed_at.is_some());

    let in_app = done
        .delivery_attempts
        .iter()
        .filter(|a| a.channel == NotificationChannel::InApp)
        .count();
    let webhook = done
        .delivery_attempts
        .iter()
        .filter(|a| a.channel == NotificationChannel::Webhook)
        .count();
    assert_eq!(in_app, 1);
    assert_eq!(webhook, 4);
    assert!(
        done.delivery_attempts
            .iter()
            .filter(|a| a.channel == NotificationChannel::Webhook)
            .all(|a| !a.is_success())
    );

    app.clock.advance(Duration::seconds(60));
    assert_eq!(app.deliver_due().await, 0);
}

#[tokio::test]
async fn scheduled_notification_waits_for_its_time() {
    let app = TestApp::new();
    let service = &app.components.state.notification_service;
    let mut scheduled = input(Uuid::new_v4(), vec![NotificationChannel::InApp]);
    scheduled.scheduled_at = Some(app.clock.now() + Duration::minutes(10));
    let created = service.create(scheduled).await.unwrap();

    assert_eq!(app.deliver_due().await, 0);
    assert_eq!(
        service.find_one(created.id).await.unwrap().status,
        NotificationStatus::Pending
    );

    app.clock.advance(Duration::minutes(10));
    assert_eq!(app.deliver_due().await, 1);

    let delivered = service.find_one(created.id).await.unwrap();
    assert_eq!(delivered.status, NotificationStatus::Delivered);
    assert!(delivered.sent_at.is_some());
    assert!(delivered.delivered_at.is_some());
}

#[tokio::test]
async fn expiry_before_schedule_fails_the_notification() {
    let app = TestApp::new();
    let service = &app.components.state.notification_service;
    let now = app.clock.now();
    let mut late = input(Uuid::new_v4(), vec![NotificationChannel::InApp]);
    late.scheduled_at = Some(now + Duration::minutes(30));
    late.expires_at = Some(now + Duration::minutes(5));
    let created = service.create(late).await.unwrap();

    app.clock.advance(Duration::minutes(30));
    assert_eq!(app.deliver_due().await, 1);

    let failed = service.find_one(created.id).await.unwrap();
    assert_eq!(failed.status, NotificationStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("Notification expired"));
    assert!(failed.delivery_attempts.is_empty());
}
