//! Payments provider webhook.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode},
};

use crate::api::dto::webhook::WebhookPayload;
use crate::error::AppError;
use crate::state::AppState;

static SIGNATURE_HEADER: HeaderName = HeaderName::from_static("x-signature");

/// Applies a subscription lifecycle event to the referenced user.
///
/// # Endpoint
///
/// `POST /api/webhooks/subscription`
///
/// The `X-Signature` header must carry the hex HMAC-SHA256 of the raw body
/// under the configured webhook secret. The signature is checked before the
/// body is parsed.
///
/// # Responses
///
/// - **200 OK**: event applied or acknowledged
/// - **400 Bad Request**: body is not a webhook envelope
/// - **401 Unauthorized**: signature missing or wrong
/// - **500 Internal Server Error**: no webhook secret configured
pub async fn subscription_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get(&SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    state.subscription_service.authenticate(&body, signature)?;

    let event = WebhookPayload::parse(&body)?.into_event()?;
    tracing::info!(event = %event.event_name, "Subscription webhook received");

    state.subscription_service.process(event).await?;

    Ok(StatusCode::OK)
}
