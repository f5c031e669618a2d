//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use backoffice_auth::Identity;

/// Logs request method, path, status, caller kind, and duration.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    let caller = response
        .extensions()
        .get::<Identity>()
        .map_or("anonymous", Identity::kind);

    info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        caller,
        duration_ms = %duration.as_millis(),
        "HTTP request"
    );

    response
}
