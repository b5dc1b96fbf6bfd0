//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use supplyhub_api::{AppComponents, build_app};
use supplyhub_auth::jwt::JwtEncoder;
use supplyhub_core::config::{AppConfig, StorageBackend};
use supplyhub_core::traits::ManualClock;
use supplyhub_database::memory::{MemoryDispatchQueue, MemoryNotificationStore};
use supplyhub_entity::user::UserRole;

/// Test application backed by the in-memory store and a manual clock.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    pub components: AppComponents,
    pub clock: Arc<ManualClock>,
    encoder: JwtEncoder,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let encoder = JwtEncoder::new(&config.auth);
        let components = AppComponents::assemble(
            config,
            clock.clone(),
            Arc::new(MemoryNotificationStore::new()),
            Arc::new(MemoryDispatchQueue::new()),
            None,
        )
        .expect("Failed to assemble test application");
        let router = build_app(components.state.clone());

        Self {
            router,
            components,
            clock,
            encoder,
        }
    }

    /// Mint a bearer token for a user with `role`.
    pub fn token(&self, user_id: Uuid, role: UserRole) -> String {
        self.encoder
            .generate_access_token(user_id, role, None)
            .expect("Failed to mint token")
    }

    pub fn admin_token(&self) -> String {
        self.token(Uuid::new_v4(), UserRole::Admin)
    }

    /// Run every dispatch pass that is due at the current manual time.
    pub async fn deliver_due(&self) -> usize {
        self.components
            .runner
            .drain_due()
            .await
            .expect("Failed to drain dispatch queue")
    }

    /// Send a request through the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Admin-sends an order status notification to `user_id` and returns its id.
    pub async fn send_order_status(&self, user_id: Uuid, status: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/notifications/send-order-status",
                Some(serde_json::json!({
                    "user_id": user_id,
                    "order_id": "ORD-1001",
                    "status": status,
                })),
                Some(&self.admin_token()),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("notification id")
            .to_string()
    }
}

/// Memory backend, no simulated latency.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.delivery.simulated_latency_ms = 0;
    config
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
}
