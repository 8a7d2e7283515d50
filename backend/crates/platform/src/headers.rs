//! Response header helpers

use axum::http::{HeaderMap, HeaderValue, header};

/// JSON content type plus anti-sniffing and anti-framing headers
///
/// An existing `Content-Type` is left alone.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
}

/// Forbid caching of the response
pub fn apply_no_store(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, max-age=0"),
    );
}
