//! Top-level router configuration combining API and public routes.
//!
//! # Route Structure
//!
//! - `GET  /{code}`                                - Short link redirect (public, host-scoped)
//! - `GET  /.well-known/assetlinks.json`           - Android App Links document
//! - `GET  /.well-known/apple-app-site-association` - iOS Universal Links document
//! - `GET  /apple-app-site-association`            - Same document, legacy location
//! - `GET  /health`                                - Health check
//! - `/api/*`                                      - Public Ingestion API and webhooks
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api`
//! - **CORS** - Any origin on `/api`
//! - **Authentication** - `x-api-key` on `/api/v1/*`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{
    apple_app_site_association_handler, asset_links_handler, fallback_handler, health_handler,
    redirect_handler,
};
use crate::api::middleware::{auth, cors, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The router must be served with connect info so the rate limiter can key
/// on the peer address.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .merge(api::routes::webhook_routes())
        .layer(rate_limit::layer())
        .layer(cors::layer());

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/.well-known/assetlinks.json", get(asset_links_handler))
        .route(
            "/.well-known/apple-app-site-association",
            get(apple_app_site_association_handler),
        )
        .route(
            "/apple-app-site-association",
            get(apple_app_site_association_handler),
        )
        .nest("/api", api_router)
        .route("/{code}", get(redirect_handler))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
