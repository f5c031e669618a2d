//! Route definitions for the back-office HTTP API.
//!
//! All routes are mounted under `/api`. The access guard runs on every
//! route, so each request is identified and metered exactly once.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the API router with the access guard applied.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(api_key_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::guard::access_guard,
        ))
        .with_state(state)
}

/// Session endpoints
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/auth/password/reset-request",
            post(handlers::auth::request_password_reset),
        )
        .route("/auth/password/reset", post(handlers::auth::reset_password))
        .route("/auth/password/change", post(handlers::auth::change_password))
        .route("/auth/verify-email", post(handlers::auth::verify_email))
        .route("/auth/validate", post(handlers::auth::validate))
}

/// API key management endpoints
fn api_key_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api-keys",
            get(handlers::api_keys::list).post(handlers::api_keys::create),
        )
        .route("/api-keys/permissions", get(handlers::api_keys::permissions))
        .route("/api-keys/stats", get(handlers::api_keys::stats))
        .route("/api-keys/me", get(handlers::api_keys::me))
        .route(
            "/api-keys/{key}/deactivate",
            patch(handlers::api_keys::deactivate),
        )
        .route(
            "/api-keys/{key}/activate",
            patch(handlers::api_keys::activate),
        )
}

/// Liveness probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
