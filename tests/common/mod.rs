use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use passgate::modules::auth::{AuthService, AuthSettings};
use passgate::router::init_router;
use passgate::state::AppState;
use passgate_config::{CorsConfig, JwtConfig, PasswordConfig};
use passgate_core::ManualClock;
use passgate_db::{InMemoryRefreshTokenStore, InMemoryUserStore};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ACCESS_EXPIRY: i64 = 15 * 60;
pub const REFRESH_EXPIRY: i64 = 7 * 24 * 60 * 60;

pub fn test_settings() -> AuthSettings {
    test_settings_with_secret(TEST_SECRET)
}

pub fn test_settings_with_secret(secret: &str) -> AuthSettings {
    AuthSettings {
        jwt: JwtConfig::new(secret, ACCESS_EXPIRY, REFRESH_EXPIRY).unwrap(),
        // Minimum bcrypt cost keeps the suite fast
        password: PasswordConfig::new(4).unwrap(),
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub service: Arc<AuthService>,
    pub clock: Arc<ManualClock>,
}

pub fn setup_service() -> TestContext {
    setup_service_with(test_settings())
}

pub fn setup_service_with(settings: AuthSettings) -> TestContext {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
    ));
    let service = AuthService::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryRefreshTokenStore::new()),
        settings,
        clock.clone(),
    )
    .unwrap();

    TestContext {
        service: Arc::new(service),
        clock,
    }
}

#[allow(dead_code)]
pub fn setup_test_app() -> (Router, Arc<ManualClock>) {
    let TestContext { service, clock } = setup_service();
    let state = AppState::new(service, CorsConfig::from_list("http://localhost:5173"));
    (init_router(state), clock)
}

#[allow(dead_code)]
pub fn generate_unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4())
}

/// Sends one request through the router and returns the status and the
/// parsed JSON body (`Value::Null` when the body is empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}
