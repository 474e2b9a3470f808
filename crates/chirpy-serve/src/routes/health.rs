//! Readiness endpoint.

use axum::http::header;
use axum::response::IntoResponse;

/// `GET /api/healthz`
///
/// Plain-text readiness probe for load balancers.
pub async fn readiness() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}
