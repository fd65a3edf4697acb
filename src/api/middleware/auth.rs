//! `x-api-key` authentication middleware for the Public Ingestion API.

use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

pub static API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Authenticates requests using the `x-api-key` header.
///
/// # Header Format
///
/// ```text
/// x-api-key: <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Read the token from `x-api-key`
/// 2. Hash it and look the hash up among stored tokens
/// 3. Bump `last_used_at` (best effort)
/// 4. Insert the matching [`crate::domain::repositories::ApiToken`] into the
///    request extensions for handlers
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is missing, not valid UTF-8 or
/// does not match a stored token.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let protected = Router::new()
///     .route("/v1/links", get(lookup_link_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(&API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized(
                "No API key provided",
                serde_json::json!({"reason": "x-api-key header is missing or invalid"}),
            )
        })?
        .to_string();

    let api_token = st.auth_service.authenticate(&token).await?;
    req.extensions_mut().insert(api_token);

    Ok(next.run(req).await)
}
