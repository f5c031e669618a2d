//! Integration tests for caller resolution and request metering.

mod helpers;

use chrono::{Duration, TimeZone, Utc};
use http::StatusCode;

use backoffice_core::clock::Clock;
use backoffice_entity::api_key::ApiKeyType;
use helpers::{TestApp, test_config};

fn limited_app(max_requests: u32) -> TestApp {
    let mut config = test_config();
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window_seconds = 60;
    let app = TestApp::with_config(config);
    // Start on a window boundary so the whole test runs inside one window.
    app.clock
        .set(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    app
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], true);
}

#[tokio::test]
async fn test_rate_limit_headers_present() {
    let app = limited_app(5);
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-ratelimit-limit"), Some("5"));
    assert_eq!(response.header("x-ratelimit-remaining"), Some("4"));
}

#[tokio::test]
async fn test_throttled_until_window_rollover() {
    let app = limited_app(3);

    for _ in 0..3 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let throttled = app.request("GET", "/api/health", None, None).await;
    assert_eq!(throttled.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(throttled.error_code(), "RATE_LIMITED");
    assert_eq!(throttled.header("retry-after"), Some("60"));
    assert_eq!(throttled.body["details"]["retryAfter"], 60);
    assert_eq!(throttled.header("x-ratelimit-remaining"), Some("0"));

    app.clock.advance(Duration::seconds(45));
    let still = app.request("GET", "/api/health", None, None).await;
    assert_eq!(still.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(still.header("retry-after"), Some("15"));

    app.clock.advance(Duration::seconds(15));
    let recovered = app.request("GET", "/api/health", None, None).await;
    assert_eq!(recovered.status, StatusCode::OK);
}

#[tokio::test]
async fn test_callers_are_metered_independently() {
    let app = limited_app(2);
    let service = app.api_key(ApiKeyType::Service).await;

    for _ in 0..2 {
        app.request("GET", "/api/health", None, None).await;
    }
    assert_eq!(
        app.request("GET", "/api/health", None, None).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    let by_key = app.request_with_key("GET", "/api/health", &service).await;
    assert_eq!(by_key.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_is_ignored_unless_trusted() {
    let app = limited_app(1);
    app.request_with_headers("GET", "/api/health", None, &[("x-forwarded-for", "10.0.0.1")])
        .await;

    let other = app
        .request_with_headers("GET", "/api/health", None, &[("x-forwarded-for", "10.0.0.2")])
        .await;
    assert_eq!(other.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_forwarded_for_separates_clients() {
    let mut config = test_config();
    config.rate_limit.max_requests = 1;
    config.rate_limit.trust_forwarded_for = true;
    let app = TestApp::with_config(config);
    app.clock
        .set(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());

    let first = app
        .request_with_headers("GET", "/api/health", None, &[("x-forwarded-for", "10.0.0.1")])
        .await;
    let second = app
        .request_with_headers(
            "GET",
            "/api/health",
            None,
            &[("x-forwarded-for", "10.0.0.2, 192.168.0.1")],
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
}

#[tokio::test]
async fn test_disabled_limiter_never_throttles() {
    let mut config = test_config();
    config.rate_limit.enabled = false;
    config.rate_limit.max_requests = 1;
    let app = TestApp::with_config(config);

    for _ in 0..5 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.header("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn test_invalid_bearer_does_not_fall_through_to_api_key() {
    let app = TestApp::new();
    let admin_key = app.api_key(ApiKeyType::Admin).await;

    let response = app
        .request_with_headers(
            "GET",
            "/api/api-keys/stats",
            None,
            &[
                ("Authorization", "Bearer not.a.token"),
                ("x-api-key", admin_key.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_valid_bearer_takes_precedence() {
    let app = TestApp::new();
    let (user, _) = app.signed_in_user("ana@example.com").await;
    let admin_key = app.api_key(ApiKeyType::Admin).await;

    let response = app
        .request_with_headers(
            "GET",
            "/api/api-keys/stats",
            None,
            &[
                ("Authorization", &format!("Bearer {user}")),
                ("x-api-key", admin_key.as_str()),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_api_key_is_anonymous() {
    let app = TestApp::new();
    let response = app
        .request_with_key("GET", "/api/api-keys/stats", "bk_unknown")
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_key_use_is_recorded() {
    let app = TestApp::new();
    let secret = app.api_key(ApiKeyType::ReadOnly).await;
    app.clock.advance(Duration::minutes(5));

    app.request_with_key("GET", "/api/health", &secret).await;

    let keys = app.state.api_keys.list_api_keys().await.unwrap();
    assert_eq!(keys[0].last_used_at, Some(app.clock.now()));
}
