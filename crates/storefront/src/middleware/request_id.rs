//! Request ID middleware for log correlation.
//!
//! Every request gets an ID, either forwarded by an upstream proxy in
//! `x-request-id` or freshly generated. It is recorded on the request span,
//! tagged on the Sentry scope and echoed back in the response headers.

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

/// Longest forwarded ID accepted as-is.
const MAX_FORWARDED_LEN: usize = 128;

/// Pick the request ID for a request.
///
/// Forwarded IDs are kept only when they are short printable ASCII, so the
/// value is always safe to log and to send back as a header.
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_FORWARDED_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request carries a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_forwarded_id_is_kept() {
        assert_eq!(resolve_request_id(&headers_with("cf-1234abcd")), "cf-1234abcd");
    }

    #[test]
    fn test_missing_id_is_generated() {
        let id = resolve_request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_unusable_forwarded_ids_are_replaced() {
        for bad in ["", "   ", "has space", &"x".repeat(MAX_FORWARDED_LEN + 1)] {
            let id = resolve_request_id(&headers_with(bad));
            assert!(Uuid::parse_str(&id).is_ok(), "kept {bad:?}");
        }
    }
}
