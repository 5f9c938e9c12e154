//! API request handlers.

pub mod analyze;
pub mod history;

use axum::http::HeaderMap;

/// Advisory user identity taken from the `x-user-id` header. The header is
/// trusted as-is; there is no authentication behind it.
pub fn user_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
