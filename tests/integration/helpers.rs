//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use backoffice_api::AppState;
use backoffice_core::clock::{ManualClock, SharedClock};
use backoffice_core::config::AppConfig;
use backoffice_database::Stores;
use backoffice_entity::api_key::ApiKeyType;

/// Password accepted by the default policy.
pub const PASSWORD: &str = "secret123";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for seeding data directly
    pub state: AppState,
    /// Frozen clock driving every expiry decision
    pub clock: ManualClock,
}

/// Configuration with cheap Argon2 parameters and a generous rate limit.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.argon2_memory_kib = 1024;
    config.auth.argon2_iterations = 1;
    config.rate_limit.max_requests = 1_000;
    config.rate_limit.window_seconds = 60;
    config
}

impl TestApp {
    /// Create a new test application over in-memory stores
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let clock = ManualClock::starting_now();
        let shared: SharedClock = Arc::new(clock.clone());
        let stores = Stores::in_memory(&config.auth);
        let state = AppState::new(config, stores, shared).expect("Failed to build state");
        let router = backoffice_api::build_app(state.clone());
        Self {
            router,
            state,
            clock,
        }
    }

    /// Register a user through the API and return the response
    pub async fn register(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "password": password,
                "name": "Test User",
            })),
            None,
        )
        .await
    }

    /// Log in and return the raw response
    pub async fn login(&self, email: &str, password: &str, remember_me: bool) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": email,
                "password": password,
                "rememberMe": remember_me,
            })),
            None,
        )
        .await
    }

    /// Register, log in, and return `(accessToken, refreshToken)`
    pub async fn signed_in_user(&self, email: &str) -> (String, String) {
        let registered = self.register(email, PASSWORD).await;
        assert_eq!(
            registered.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            registered.body
        );
        let response = self.login(email, PASSWORD, false).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        (
            response.str("accessToken").to_string(),
            response.str("refreshToken").to_string(),
        )
    }

    /// Create an administrator and return an access token for them
    pub async fn admin_token(&self) -> String {
        self.state
            .sessions
            .bootstrap_admin("admin@example.com", PASSWORD, "Admin")
            .await
            .expect("Failed to create admin");
        let response = self.login("admin@example.com", PASSWORD, false).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.str("accessToken").to_string()
    }

    /// Create a preset API key directly and return its secret
    pub async fn api_key(&self, key_type: ApiKeyType) -> String {
        self.state
            .api_keys
            .create_api_key(key_type, "test key", None)
            .await
            .expect("Failed to create API key")
            .secret
    }

    /// Make an HTTP request, optionally with a bearer token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {t}"));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|a| vec![("Authorization", a)])
            .unwrap_or_default();
        self.request_with_headers(method, path, body, &headers).await
    }

    /// Make an HTTP request authenticated with an API key
    pub async fn request_with_key(&self, method: &str, path: &str, key: &str) -> TestResponse {
        self.request_with_headers(method, path, None, &[("x-api-key", key)])
            .await
    }

    /// Make an HTTP request with arbitrary headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, *value);
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
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// A string field of the body, panicking when absent
    pub fn str(&self, field: &str) -> &str {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("No '{field}' in {:?}", self.body))
    }

    /// The machine-readable error code
    pub fn error_code(&self) -> &str {
        self.str("error")
    }

    /// A header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
