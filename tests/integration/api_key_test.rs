//! Integration tests for API key management and authentication.

mod helpers;

use http::StatusCode;
use serde_json::json;

use backoffice_entity::api_key::ApiKeyType;
use helpers::TestApp;

#[tokio::test]
async fn test_admin_creates_custom_key() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/api-keys",
            Some(json!({
                "name": "reporting",
                "permissions": ["clients:read", "emails:read"],
                "description": "Nightly export",
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let secret = response.str("key").to_string();
    let prefix = response.body["apiKey"]["prefix"].as_str().unwrap_or_default();
    assert!(!prefix.is_empty());
    assert!(secret.starts_with(prefix));
    assert_eq!(response.body["apiKey"]["type"], "custom");
    assert_eq!(response.body["apiKey"]["isActive"], true);
    assert_eq!(
        response.body["apiKey"]["permissions"],
        json!(["clients:read", "emails:read"])
    );
    assert!(response.body["apiKey"].get("keyHash").is_none());
    assert!(!response.str("warning").is_empty());

    let me = app.request_with_key("GET", "/api/api-keys/me", &secret).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["apiKey"]["name"], "reporting");
}

#[tokio::test]
async fn test_preset_key_types() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/api-keys",
            Some(json!({ "name": "hooks", "type": "webhook" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["apiKey"]["type"], "webhook");
    assert_eq!(
        response.body["apiKey"]["permissions"],
        json!(["emails:read", "appointments:read", "appointments:write"])
    );

    let unknown = app
        .request(
            "POST",
            "/api/api-keys",
            Some(json!({ "name": "bogus", "type": "superuser" })),
            Some(&admin),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_permission_rejected_without_side_effects() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/api-keys",
            Some(json!({
                "name": "broken",
                "permissions": ["clients:read", "clients:destroy"],
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_PERMISSIONS");
    assert!(response.body["details"].is_object());
    assert_eq!(app.state.stores.api_keys.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_permission_list_rejected() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/api-keys",
            Some(json!({ "name": "empty", "permissions": [] })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_PERMISSIONS");
}

#[tokio::test]
async fn test_list_and_stats() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.api_key(ApiKeyType::Service).await;
    let read_only = app.api_key(ApiKeyType::ReadOnly).await;
    app.state
        .api_keys
        .deactivate_api_key(&read_only)
        .await
        .unwrap();

    let list = app.request("GET", "/api/api-keys", None, Some(&admin)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["count"], 2);
    assert_eq!(list.body["apiKeys"].as_array().map(Vec::len), Some(2));

    let stats = app
        .request("GET", "/api/api-keys/stats", None, Some(&admin))
        .await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["stats"]["total"], 2);
    assert_eq!(stats.body["stats"]["active"], 1);
    assert_eq!(stats.body["stats"]["inactive"], 1);
    assert_eq!(stats.body["stats"]["byType"]["service"], 1);
    assert_eq!(stats.body["stats"]["byType"]["read_only"], 1);
}

#[tokio::test]
async fn test_deactivate_is_idempotent_and_blocks_authentication() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let secret = app.api_key(ApiKeyType::Service).await;

    assert_eq!(
        app.request_with_key("GET", "/api/api-keys/me", &secret)
            .await
            .status,
        StatusCode::OK
    );

    let path = format!("/api/api-keys/{secret}/deactivate");
    for _ in 0..2 {
        let response = app.request("PATCH", &path, None, Some(&admin)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["success"], true);
    }

    let me = app.request_with_key("GET", "/api/api-keys/me", &secret).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let path = format!("/api/api-keys/{secret}/activate");
    let response = app.request("PATCH", &path, None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        app.request_with_key("GET", "/api/api-keys/me", &secret)
            .await
            .status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_toggle_unknown_key_is_not_found() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(
            "PATCH",
            "/api/api-keys/bk_doesnotexist/deactivate",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "API_KEY_NOT_FOUND");
}

#[tokio::test]
async fn test_management_requires_permission() {
    let app = TestApp::new();
    let (user, _) = app.signed_in_user("ana@example.com").await;

    let forbidden = app.request("GET", "/api/api-keys", None, Some(&user)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.error_code(), "INSUFFICIENT_PERMISSIONS");

    let anonymous = app.request("GET", "/api/api-keys", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "NOT_AUTHENTICATED");

    let service = app.api_key(ApiKeyType::Service).await;
    let by_key = app.request_with_key("GET", "/api/api-keys", &service).await;
    assert_eq!(by_key.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_key_can_manage_keys() {
    let app = TestApp::new();
    let admin_key = app.api_key(ApiKeyType::Admin).await;

    let response = app
        .request_with_key("GET", "/api/api-keys/stats", &admin_key)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["stats"]["total"], 1);
}

#[tokio::test]
async fn test_me_requires_api_key() {
    let app = TestApp::new();
    let (user, _) = app.signed_in_user("ana@example.com").await;

    let response = app
        .request("GET", "/api/api-keys/me", None, Some(&user))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_permissions_catalog() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/api/api-keys/permissions", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let permissions = response.body["permissions"].as_array().unwrap();
    assert!(permissions.len() >= 12);
    let key_types = response.body["keyTypes"].as_array().unwrap();
    assert_eq!(key_types.len(), 5);
}
