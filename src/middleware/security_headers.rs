//! Default security response headers.
//!
//! Responses of this API carry bearer-token derived data (`/token` echoes claims),
//! so nothing may be cached by browsers or intermediaries.
//!
//! Responsibility:
//! - No caching (`cache-control`, `pragma`, `expires`)
//! - MIME sniffing protection
//! - Clickjacking protection

use axum::Router;
use axum::http::header::{self, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

const DEFAULT_HEADERS: [(HeaderName, &str); 5] = [
    (
        header::CACHE_CONTROL,
        "no-cache, no-store, max-age=0, must-revalidate",
    ),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
];

/// Apply the default security headers to all responses (handlers may override).
pub fn apply(router: Router) -> Router {
    DEFAULT_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                name,
                HeaderValue::from_static(value),
            ))
        })
}
