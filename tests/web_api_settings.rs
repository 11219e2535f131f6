//! Web API Security Settings Tests
//!
//! Integration tests for reading and tuning the security policy at runtime.

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use common::{create_test_server, TEST_PASSWORD, TEST_USERNAME};
use serde_json::{json, Value};

const FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

async fn login(server: &axum_test::TestServer) {
    server
        .post("/api/auth/login")
        .json(&json!({
            "username": TEST_USERNAME,
            "password": TEST_PASSWORD
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_get_settings_requires_auth() {
    let ctx = create_test_server();

    let response = ctx.server.get("/api/settings/security").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_settings_returns_current_policy() {
    let ctx = create_test_server();
    login(&ctx.server).await;

    let response = ctx.server.get("/api/settings/security").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["session_timeout_minutes"], 60);
    assert_eq!(body["data"]["max_login_attempts"], 5);
    assert_eq!(body["data"]["lockout_duration_minutes"], 15);
}

#[tokio::test]
async fn test_update_settings_requires_auth() {
    let ctx = create_test_server();

    let response = ctx
        .server
        .put("/api/settings/security")
        .json(&json!({
            "session_timeout_minutes": 30,
            "max_login_attempts": 3,
            "lockout_duration_minutes": 10
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_settings_applies_and_persists() {
    let ctx = create_test_server();
    login(&ctx.server).await;

    let response = ctx
        .server
        .put("/api/settings/security")
        .json(&json!({
            "session_timeout_minutes": 30,
            "max_login_attempts": 3,
            "lockout_duration_minutes": 10
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["session_timeout_minutes"], 30);

    // The shared policy and the registry both picked up the change
    let policy = ctx.state.policy.get();
    assert_eq!(policy.max_login_attempts, 3);
    assert_eq!(ctx.state.registry.idle_timeout_minutes(), 30);

    // Persisted through the settings store
    let stored = ctx.state.settings.load().unwrap().unwrap();
    assert_eq!(stored.lockout_duration_minutes, 10);

    // A follow-up GET reflects the new values
    let response = ctx.server.get("/api/settings/security").await;
    let body: Value = response.json();
    assert_eq!(body["data"]["max_login_attempts"], 3);
}

#[tokio::test]
async fn test_update_settings_rejects_out_of_range() {
    let ctx = create_test_server();
    login(&ctx.server).await;

    let response = ctx
        .server
        .put("/api/settings/security")
        .json(&json!({
            "session_timeout_minutes": 0,
            "max_login_attempts": 0,
            "lockout_duration_minutes": 999999
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Nothing changed
    assert_eq!(ctx.state.policy.get().max_login_attempts, 5);
}

#[tokio::test]
async fn test_tightened_policy_takes_effect_without_restart() {
    let ctx = create_test_server();
    login(&ctx.server).await;

    ctx.server
        .put("/api/settings/security")
        .json(&json!({
            "session_timeout_minutes": 60,
            "max_login_attempts": 2,
            "lockout_duration_minutes": 5
        }))
        .await
        .assert_status_ok();

    // Two failures from a fresh address now trigger the lockout
    let ip = HeaderValue::from_static("203.0.113.50");
    let _ = ctx
        .server
        .post("/api/auth/login")
        .add_header(FORWARDED_FOR, ip.clone())
        .json(&json!({ "username": TEST_USERNAME, "password": "wrong" }))
        .await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .add_header(FORWARDED_FOR, ip)
        .json(&json!({ "username": TEST_USERNAME, "password": "wrong" }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"]["retry_after_minutes"], 5);
}
