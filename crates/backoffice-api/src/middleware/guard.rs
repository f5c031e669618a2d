//! Access guard middleware.
//!
//! Resolves the caller once per request (bearer token, then `x-api-key`,
//! then anonymous), meters the request against the fixed-window limiter,
//! and stores the [`Identity`] in the request extensions for extractors.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use tracing::warn;

use backoffice_auth::Identity;
use backoffice_auth::guard::RateDecision;
use backoffice_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying an API key secret.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Requests allowed per window.
pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
/// Requests left in the current window.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// The caller's address as resolved by [`access_guard`], available to
/// handlers through `Extension<ClientAddr>`. `None` when neither a trusted
/// forwarding header nor the socket peer is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAddr(pub Option<String>);

/// Resolves the caller identity and enforces the request rate limit.
pub async fn access_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request.headers().typed_get::<Authorization<Bearer>>();
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let identity = match state
        .guard
        .resolve(bearer.as_ref().map(|b| b.token()), api_key.as_deref())
        .await
    {
        Ok(identity) => identity,
        Err(e) => return ApiError(e).into_response(),
    };

    let client_addr = ClientAddr(client_ip(
        &request,
        state.config.rate_limit.trust_forwarded_for,
    ));
    let client_ip = client_addr.0.as_deref().unwrap_or(UNKNOWN_CLIENT);
    let decision = state.guard.check_rate(&identity, client_ip);
    let metered = state.config.rate_limit.enabled;

    if !decision.allowed {
        warn!(
            caller = identity.kind(),
            key = %identity.rate_limit_key(client_ip),
            retry_after = decision.retry_after_secs,
            "Rate limit exceeded"
        );
        let err = AppError::rate_limited("Too many requests, please try again later")
            .with_details(serde_json::json!({ "retryAfter": decision.retry_after_secs }));
        let mut response = ApiError(err).into_response();
        apply_rate_headers(&mut response, &decision);
        response.extensions_mut().insert(identity);
        return response;
    }

    request.extensions_mut().insert(identity.clone());
    request.extensions_mut().insert(client_addr);
    let mut response = next.run(request).await;
    if metered {
        apply_rate_headers(&mut response, &decision);
    }
    response.extensions_mut().insert(identity);
    response
}

fn apply_rate_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    if !decision.allowed {
        headers.insert(
            header::RETRY_AFTER,
            HeaderValue::from(decision.retry_after_secs),
        );
    }
}

/// The caller's address: the first `x-forwarded-for` hop when trusted, the
/// socket peer otherwise.
fn client_ip(request: &Request, trust_forwarded_for: bool) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;

    fn request(forwarded: Option<&str>, peer: Option<SocketAddr>) -> Request {
        let mut builder = Request::builder().uri("/api/health");
        if let Some(value) = forwarded {
            builder = builder.header(FORWARDED_FOR, value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(addr) = peer {
            request.extensions_mut().insert(ConnectInfo(addr));
        }
        request
    }

    #[test]
    fn test_client_ip_prefers_socket_when_untrusted() {
        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let req = request(Some("203.0.113.9"), Some(peer));
        assert_eq!(client_ip(&req, false).as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn test_client_ip_uses_first_forwarded_hop_when_trusted() {
        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let req = request(Some("203.0.113.9, 10.0.0.1"), Some(peer));
        assert_eq!(client_ip(&req, true).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_client_ip_ignores_untrusted_header_without_peer() {
        let req = request(Some("6.6.6.6"), None);
        assert_eq!(client_ip(&req, false), None);
    }

    #[test]
    fn test_client_ip_unknown_without_sources() {
        assert_eq!(client_ip(&request(None, None), true), None);
    }
}
