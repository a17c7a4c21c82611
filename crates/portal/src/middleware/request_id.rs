//! Request ID middleware for request tracing and correlation.
//!
//! Generates a UUID v4 for each request if the upstream proxy (the Fly.io
//! edge, a load balancer) did not already supply one. The request ID is:
//! - Recorded in the current tracing span
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound request ID we will echo; anything bigger is replaced.
const MAX_INBOUND_LEN: usize = 64;

/// Middleware that ensures every request has a unique request ID.
///
/// A well-formed `x-request-id` header from an upstream proxy is reused so
/// log lines can be correlated across hops. Everything else (absent, too
/// long, non-printable) gets a fresh UUID v4.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        inbound_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    // Record in current span for structured logging
    Span::current().record("request_id", &request_id);

    // Set in Sentry scope for error correlation
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    // Add to response headers so clients can reference the request ID
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Extract a usable request ID from the inbound headers.
///
/// The value is attacker-controlled and ends up in logs, Sentry tags, and
/// response headers, so only short printable-ASCII values are accepted.
fn inbound_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;

    if value.is_empty() || value.len() > MAX_INBOUND_LEN {
        return None;
    }
    if !value.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }

    Some(value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_upstream_id_is_reused() {
        let headers = headers_with("fly-req-0199a8b2");
        assert_eq!(
            inbound_request_id(&headers),
            Some("fly-req-0199a8b2".to_string())
        );
    }

    #[test]
    fn test_missing_header_yields_none() {
        assert_eq!(inbound_request_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_empty_header_is_rejected() {
        assert_eq!(inbound_request_id(&headers_with("")), None);
    }

    #[test]
    fn test_oversized_header_is_rejected() {
        let long = "a".repeat(65);
        assert_eq!(inbound_request_id(&headers_with(&long)), None);
    }

    #[test]
    fn test_max_length_header_is_accepted() {
        let max = "a".repeat(64);
        assert_eq!(inbound_request_id(&headers_with(&max)), Some(max));
    }

    #[test]
    fn test_header_with_spaces_is_rejected() {
        assert_eq!(inbound_request_id(&headers_with("two words")), None);
    }
}
