//! Response hardening and inbound header hygiene
//!
//! Every response carries a fixed set of browser security headers. Proxy
//! headers that identify the submitter are dropped before the request reaches
//! request tracing, so no client address ends up in logs.

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Inbound headers removed before tracing and routing
pub const FORWARDING_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "forwarded"];

/// Response headers set on every response, overriding handler values
pub fn security_headers() -> [(HeaderName, HeaderValue); 5] {
    [
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-site"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("interest-cohort=()"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
    ]
}

/// Layer the security headers onto a router
pub fn with_security_headers(router: Router) -> Router {
    security_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(name, value))
        })
}

/// Middleware dropping [`FORWARDING_HEADERS`] from the request
pub async fn strip_forwarding_headers(mut request: Request, next: Next) -> Response {
    let headers = request.headers_mut();
    for name in FORWARDING_HEADERS {
        headers.remove(name);
    }
    next.run(request).await
}
