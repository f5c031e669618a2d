//! Integration tests for the session flows.

mod helpers;

use chrono::Duration;
use http::StatusCode;

use backoffice_api::AppState;
use backoffice_auth::secret::hash_token;
use backoffice_core::ErrorKind;
use backoffice_core::clock::{Clock, SystemClock};
use backoffice_database::Stores;
use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();

    let registered = app.register("ana@example.com", PASSWORD).await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["success"], true);
    assert_eq!(registered.body["user"]["email"], "ana@example.com");
    assert_eq!(registered.body["user"]["role"], "user");

    let response = app.login("ana@example.com", PASSWORD, false).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(!response.str("accessToken").is_empty());
    assert!(!response.str("refreshToken").is_empty());
    assert_eq!(response.str("tokenType"), "Bearer");
    assert_eq!(response.body["user"]["email"], "ana@example.com");
    assert!(response.body["user"]["permissions"].is_array());
    assert!(response.body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_expires_in_follows_remember_me() {
    let app = TestApp::new();
    app.register("ana@example.com", PASSWORD).await;

    let short = app.login("ana@example.com", PASSWORD, false).await;
    assert_eq!(short.body["expiresIn"], 900);
    assert_eq!(short.body["accessExpiresIn"], 900);

    let long = app.login("ana@example.com", PASSWORD, true).await;
    assert_eq!(long.body["expiresIn"], 604_800);
    assert_eq!(long.body["accessExpiresIn"], 900);
}

#[tokio::test]
async fn test_login_rejections_are_generic() {
    let app = TestApp::new();
    app.register("ana@example.com", PASSWORD).await;

    let wrong = app.login("ana@example.com", "not-the-password", false).await;
    let unknown = app.login("nobody@example.com", PASSWORD, false).await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error_code(), "INVALID_CREDENTIALS");
    assert_eq!(unknown.error_code(), "INVALID_CREDENTIALS");
    assert_eq!(wrong.body["message"], unknown.body["message"]);
    assert_eq!(wrong.body["success"], false);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    assert_eq!(
        app.register("dup@example.com", PASSWORD).await.status,
        StatusCode::CREATED
    );

    let again = app.register("Dup@Example.com", PASSWORD).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.error_code(), "EMAIL_IN_USE");
    assert_eq!(app.state.stores.users.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_refuses_admin_role() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": "sneaky@example.com",
                "password": PASSWORD,
                "name": "Sneaky",
                "role": "admin",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "ROLE_NOT_ALLOWED");
    assert_eq!(app.state.stores.users.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_email() {
    let app = TestApp::new();

    let weak = app.register("weak@example.com", "short").await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.error_code(), "WEAK_PASSWORD");

    let bad = app.register("not-an-email", PASSWORD).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "a@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = TestApp::new();
    let (access, _) = app.signed_in_user("ana@example.com").await;

    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], "ana@example.com");

    let anonymous = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_expired_access_token_is_anonymous() {
    let app = TestApp::new();
    let (access, _) = app.signed_in_user("ana@example.com").await;

    app.clock.advance(Duration::minutes(15));

    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.error_code(), "NOT_AUTHENTICATED");

    let validated = app
        .request(
            "POST",
            "/api/auth/validate",
            Some(serde_json::json!({ "token": access })),
            None,
        )
        .await;
    assert_eq!(validated.body["valid"], false);
    assert_eq!(validated.body["reason"], "EXPIRED");
}

#[tokio::test]
async fn test_validate_reports_token_identity() {
    let app = TestApp::new();
    let (access, _) = app.signed_in_user("ana@example.com").await;

    app.clock.advance(Duration::minutes(15) - Duration::seconds(1));
    let response = app
        .request(
            "POST",
            "/api/auth/validate",
            Some(serde_json::json!({ "token": access })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);
    assert_eq!(response.body["user"]["email"], "ana@example.com");
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = TestApp::new();
    let (_, refresh) = app.signed_in_user("ana@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("tokenType"), "Bearer");
    assert!(response.body.get("refreshToken").is_none());

    let access = response.str("accessToken").to_string();
    let me = app.request("GET", "/api/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_fails_after_expiry() {
    let app = TestApp::new();
    let (_, refresh) = app.signed_in_user("ana@example.com").await;

    app.clock.advance(Duration::minutes(16));
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_logout_revokes_every_refresh_token() {
    let app = TestApp::new();
    let (access, first) = app.signed_in_user("ana@example.com").await;
    let second = app.login("ana@example.com", PASSWORD, true).await;
    let second = second.str("refreshToken").to_string();

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&access))
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["success"], true);

    for token in [first, second] {
        let response = app
            .request(
                "POST",
                "/api/auth/refresh",
                Some(serde_json::json!({ "refreshToken": token })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "INVALID_REFRESH_TOKEN");
    }
}

#[tokio::test]
async fn test_password_reset_is_single_use() {
    let app = TestApp::new();
    app.register("ana@example.com", PASSWORD).await;

    let requested = app
        .request(
            "POST",
            "/api/auth/password/reset-request",
            Some(serde_json::json!({ "email": "ana@example.com" })),
            None,
        )
        .await;
    assert_eq!(requested.status, StatusCode::OK);
    let token = requested.str("resetToken").to_string();

    let body = serde_json::json!({ "token": token, "newPassword": "fresh-pass-1" });
    let first = app
        .request("POST", "/api/auth/password/reset", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["success"], true);

    let second = app
        .request("POST", "/api/auth/password/reset", Some(body), None)
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error_code(), "INVALID_TOKEN");

    assert_eq!(
        app.login("ana@example.com", "fresh-pass-1", false)
            .await
            .status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_reset_request_is_uniform_for_unknown_email() {
    let app = TestApp::new();
    app.register("ana@example.com", PASSWORD).await;

    let known = app
        .request(
            "POST",
            "/api/auth/password/reset-request",
            Some(serde_json::json!({ "email": "ana@example.com" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/password/reset-request",
            Some(serde_json::json!({ "email": "ghost@example.com" })),
            None,
        )
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body["message"], unknown.body["message"]);
    assert!(unknown.body.get("resetToken").is_none());
}

#[tokio::test]
async fn test_reset_token_hidden_outside_development() {
    let mut config = helpers::test_config();
    config.server.environment = "production".to_string();
    let app = TestApp::with_config(config);
    app.register("ana@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/password/reset-request",
            Some(serde_json::json!({ "email": "ana@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("resetToken").is_none());
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (access, refresh) = app.signed_in_user("ana@example.com").await;

    let wrong = app
        .request(
            "POST",
            "/api/auth/password/change",
            Some(serde_json::json!({
                "currentPassword": "not-it-at-all",
                "newPassword": "changed-pass-1",
            })),
            Some(&access),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.error_code(), "WRONG_PASSWORD");

    let changed = app
        .request(
            "POST",
            "/api/auth/password/change",
            Some(serde_json::json!({
                "currentPassword": PASSWORD,
                "newPassword": "changed-pass-1",
            })),
            Some(&access),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let refreshed = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.login("ana@example.com", PASSWORD, false).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_verify_email() {
    let app = TestApp::new();
    let registered = app.register("ana@example.com", PASSWORD).await;
    assert_eq!(registered.body["user"]["emailVerified"], false);
    let token = registered.str("verificationToken").to_string();

    let verified = app
        .request(
            "POST",
            "/api/auth/verify-email",
            Some(serde_json::json!({ "token": token })),
            None,
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK);

    let login = app.login("ana@example.com", PASSWORD, false).await;
    assert_eq!(login.body["user"]["emailVerified"], true);

    let again = app
        .request(
            "POST",
            "/api/auth/verify-email",
            Some(serde_json::json!({ "token": token })),
            None,
        )
        .await;
    assert_eq!(again.error_code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_login_records_last_login() {
    let app = TestApp::new();
    let registered = app.register("ana@example.com", PASSWORD).await;
    let id = registered.body["user"]["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("user id");

    app.login("ana@example.com", PASSWORD, false).await;

    let user = app
        .state
        .stores
        .users
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.last_login_at, Some(app.clock.now()));
}

async fn stored_login_ip(app: &TestApp, forwarded_for: &str) -> Option<String> {
    app.register("ana@example.com", PASSWORD).await;
    let response = app
        .request_with_headers(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "ana@example.com",
                "password": PASSWORD,
            })),
            &[("x-forwarded-for", forwarded_for), ("User-Agent", "curl/8.5")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let record = app
        .state
        .stores
        .refresh_tokens
        .find_by_hash(&hash_token(response.str("refreshToken")))
        .await
        .unwrap()
        .expect("refresh token stored");
    assert_eq!(record.user_agent.as_deref(), Some("curl/8.5"));
    record.ip_address
}

#[tokio::test]
async fn test_untrusted_forwarded_for_not_recorded_on_session() {
    let app = TestApp::new();
    assert_eq!(stored_login_ip(&app, "6.6.6.6").await, None);
}

#[tokio::test]
async fn test_trusted_forwarded_for_recorded_on_session() {
    let mut config = helpers::test_config();
    config.rate_limit.trust_forwarded_for = true;
    let app = TestApp::with_config(config);
    assert_eq!(
        stored_login_ip(&app, "6.6.6.6, 10.0.0.1").await.as_deref(),
        Some("6.6.6.6")
    );
}

#[test]
fn test_oversized_session_lifetime_is_configuration_error() {
    let mut config = helpers::test_config();
    config.auth.remember_me_ttl_days = 200_000_000_000;
    assert!(config.validate().is_err());

    let stores = Stores::in_memory(&config.auth);
    let err = AppState::new(config, stores, SystemClock::shared()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}
