//! API middleware for request ids and access logging.

use axum::{
    body::Body,
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// Request ID Middleware
// ============================================================================

/// Header carrying the request id in both directions.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest incoming id reused verbatim; anything longer gets a fresh one.
const MAX_INCOMING_ID_LEN: usize = 128;

/// Tag every request with an id that shows up in the JSON error envelope,
/// the access log and the `x-request-id` response header.
///
/// Environment:
/// - FLOWLENS_TRUST_REQUEST_ID: If "true", reuse a caller-supplied
///   `x-request-id` (default: false, always generate)
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let trust_incoming = std::env::var("FLOWLENS_TRUST_REQUEST_ID")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let request_id = resolve_request_id(request.headers(), trust_incoming);

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

/// Pick the caller's id when trusted and sane, otherwise a new UUID.
fn resolve_request_id(headers: &HeaderMap, trust_incoming: bool) -> String {
    let incoming = headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_INCOMING_ID_LEN);

    match incoming {
        Some(id) if trust_incoming => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Request ID extension for extracting in handlers.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

// ============================================================================
// Access Logging Middleware
// ============================================================================

/// Log each request with method, path, status, duration and request ID.
///
/// Environment:
/// - FLOWLENS_ACCESS_LOG: Set to "false" to disable access logging (default: enabled)
pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let enabled = std::env::var("FLOWLENS_ACCESS_LOG")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true);

    if !enabled {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());

    let response = next.run(request).await;

    info!(
        target: "flowlens::access",
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = ?request_id,
        "request completed"
    );

    response
}
