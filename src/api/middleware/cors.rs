//! CORS policy for the ingestion API.

use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};

use super::auth::API_KEY_HEADER;

/// Any origin may call the API; only the methods and headers it uses are allowed.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::clone(&API_KEY_HEADER),
        ])
}
