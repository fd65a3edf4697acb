//! App association documents for Android App Links and iOS Universal Links.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde_json::json;

use crate::api::dto::well_known::{AppleAppSiteAssociation, AssetLinkStatement};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::host_from_headers;

/// `GET /.well-known/assetlinks.json`
///
/// Served for the project owning the request host. `404` when the host is
/// unknown or the project has no Android app bound.
pub async fn asset_links_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AssetLinkStatement>>, AppError> {
    let app = state
        .project_service
        .find_for_host(host_from_headers(&headers))
        .await?
        .and_then(|p| p.android_app)
        .ok_or_else(|| AppError::not_found("Android app not found", json!({})))?;

    Ok(Json(AssetLinkStatement::document(&app)))
}

/// `GET /.well-known/apple-app-site-association` and
/// `GET /apple-app-site-association`
pub async fn apple_app_site_association_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AppleAppSiteAssociation>, AppError> {
    let app = state
        .project_service
        .find_for_host(host_from_headers(&headers))
        .await?
        .and_then(|p| p.ios_app)
        .ok_or_else(|| AppError::not_found("iOS app not found", json!({})))?;

    Ok(Json(AppleAppSiteAssociation::document(&app)))
}
