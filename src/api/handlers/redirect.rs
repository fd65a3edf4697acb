//! Public redirect endpoint served on every project host.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::application::services::RedirectOutcome;
use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::{host_from_headers, user_agent_from_headers};

/// Social preview page shown to crawlers instead of a redirect.
#[derive(Template, WebTemplate)]
#[template(path = "placeholder.html")]
pub struct PlaceholderTemplate {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub twitter_card: &'static str,
}

impl PlaceholderTemplate {
    pub fn from_link(link: &Link) -> Self {
        let url = link.short_url();
        let image = link.metadata.image.clone().unwrap_or_default();

        Self {
            title: link.metadata.title.clone().unwrap_or_else(|| url.clone()),
            description: link.metadata.description.clone().unwrap_or_default(),
            twitter_card: if image.is_empty() {
                "summary"
            } else {
                "summary_large_image"
            },
            image,
            url,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

/// Resolves a short code on the request host and redirects.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Responses
///
/// - **307 Temporary Redirect**: `Location` is the store listing or long URL
/// - **200 OK**: HTML preview page for social crawlers (no click recorded)
/// - **404 Not Found**: HTML page for unknown hosts and codes
/// - **500 Internal Server Error**: database failure
///
/// The click is recorded on a detached task after the response is built, so
/// counter writes never delay or fail the redirect.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let outcome = state
        .redirect_service
        .resolve(
            host_from_headers(&headers),
            &code,
            user_agent_from_headers(&headers),
        )
        .await?;

    match outcome {
        RedirectOutcome::NotFound => Ok(not_found_page()),
        RedirectOutcome::Placeholder(link) => {
            Ok(PlaceholderTemplate::from_link(&link).into_response())
        }
        RedirectOutcome::Redirect {
            url,
            link_id,
            channel,
        } => {
            let location = HeaderValue::from_str(&url).map_err(|_| {
                tracing::error!(link_id, "Destination is not a valid Location header");
                AppError::internal("Invalid redirect destination", json!({ "link_id": link_id }))
            })?;

            let response =
                (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response();

            state.click_recorder.record(link_id, channel);

            Ok(response)
        }
    }
}

/// HTML 404 used for every unresolvable public request.
pub fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate).into_response()
}

/// Fallback for paths that are not a single code segment.
pub async fn fallback_handler() -> Response {
    not_found_page()
}
