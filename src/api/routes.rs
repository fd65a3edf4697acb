//! API route configuration.
//!
//! Link endpoints require an `x-api-key` header checked by
//! [`crate::api::middleware::auth`]. The subscription webhook authenticates
//! with its own body signature instead.

use crate::api::handlers::{
    create_link_handler, lookup_link_handler, subscription_webhook_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Public Ingestion API routes, protected by API key authentication.
///
/// # Endpoints
///
/// - `POST /v1/links` - Create a short link in one of the caller's projects
/// - `GET  /v1/links` - Look up the short URL of `alias` on `domain`
pub fn protected_routes() -> Router<AppState> {
    Router::new().route(
        "/v1/links",
        get(lookup_link_handler).post(create_link_handler),
    )
}

/// Signed webhook routes.
///
/// # Endpoints
///
/// - `POST /webhooks/subscription` - Payments provider subscription events
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhooks/subscription", post(subscription_webhook_handler))
}
