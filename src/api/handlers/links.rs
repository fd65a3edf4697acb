//! Public Ingestion API: create and look up short links.

use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, CreateLinkResponse, LookupLinkQuery, LookupLinkResponse,
};
use crate::domain::repositories::ApiToken;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link in one of the caller's projects.
///
/// # Endpoint
///
/// `POST /api/v1/links`
///
/// # Request Body
///
/// ```json
/// {
///   "link": "https://example.com/landing",
///   "projectDomain": "foo",
///   "metaData": { "title": "Landing", "description": "...", "image": "https://..." },
///   "androidReferrer": "utm_source=newsletter"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "linkId": 42, "url": "https://foo.directt.to/xY12abCD" }`.
///
/// # Errors
///
/// - `400` malformed body or failed validation
/// - `401` missing or invalid `x-api-key`
/// - `402` free tier link limit reached
/// - `404` project domain does not belong to the caller
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ApiToken>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    let link = state
        .link_service
        .create_link(&token.user_id, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            link_id: link.id,
            url: link.short_url(),
        }),
    ))
}

/// Looks up the canonical short URL of `alias` on `domain`.
///
/// # Endpoint
///
/// `GET /api/v1/links?domain=foo.directt.to&alias=xY12abCD`
///
/// Exact match on the stored `(domain, code)` pair. The lookup is not scoped
/// to the caller's projects.
pub async fn lookup_link_handler(
    State(state): State<AppState>,
    query: Result<Query<LookupLinkQuery>, QueryRejection>,
) -> Result<Json<LookupLinkResponse>, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::bad_request("Invalid query", json!({ "reason": e.body_text() }))
    })?;

    let (Some(domain), Some(alias)) = (
        query.domain.filter(|d| !d.trim().is_empty()),
        query.alias.filter(|a| !a.trim().is_empty()),
    ) else {
        return Err(AppError::bad_request(
            "Missing domain or alias",
            json!({ "required": ["domain", "alias"] }),
        ));
    };

    let url = state
        .link_service
        .lookup_short_url(domain.trim(), alias.trim())
        .await?;

    Ok(Json(LookupLinkResponse { url }))
}
