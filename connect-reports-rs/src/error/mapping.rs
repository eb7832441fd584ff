//! Error mapping for API responses
//!
//! Converts a failed HTTP response into the uniform `ServiceError::Api`
//! report and classifies status codes for logging.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::ServiceError;

/// Header carrying the server-side correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Whether a status code counts as success
pub fn is_success_status(status: StatusCode) -> bool {
    (200..300).contains(&status.as_u16())
}

/// Extract the correlation id from response headers.
///
/// Header names are case-insensitive, so `X-Request-ID` and `x-request-id`
/// resolve to the same entry.
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Map a non-2xx response to a ServiceError carrying status, correlation id and raw body
pub fn map_http_error(status: StatusCode, headers: &HeaderMap, body: String) -> ServiceError {
    ServiceError::api(status.as_u16(), extract_request_id(headers), body)
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}
