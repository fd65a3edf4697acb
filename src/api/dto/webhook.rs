//! Payments provider webhook payload.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::application::services::SubscriptionEvent;
use crate::error::AppError;

/// Envelope of a subscription webhook.
///
/// ```json
/// {
///   "meta": { "event_name": "subscription_created", "custom_data": { "user_id": "user_1" } },
///   "data": { "id": "sub_9", "attributes": { "customer_id": 42, "variant_id": 7, "renews_at": "..." } }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub meta: Option<WebhookMeta>,
    pub data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMeta {
    pub event_name: String,
    pub custom_data: Option<CustomData>,
}

#[derive(Debug, Deserialize)]
pub struct CustomData {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    /// Subscription id; string or number depending on the provider.
    pub id: Option<Value>,
    pub attributes: Option<SubscriptionAttributes>,
}

/// Provider ids arrive as numbers or strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionAttributes {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub customer_id: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub variant_id: Option<i64>,
    pub renews_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl WebhookPayload {
    /// Parses a raw body that has already passed signature verification.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed JSON or a missing `meta`.
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(body).map_err(|e| {
            AppError::bad_request("Invalid webhook payload", json!({ "reason": e.to_string() }))
        })
    }

    pub fn into_event(self) -> Result<SubscriptionEvent, AppError> {
        let meta = self
            .meta
            .ok_or_else(|| AppError::bad_request("Webhook does not have meta", json!({})))?;

        let (subscription_id, attributes) = match self.data {
            Some(data) => (
                data.id.and_then(id_to_string),
                data.attributes.unwrap_or_default(),
            ),
            None => (None, SubscriptionAttributes::default()),
        };

        Ok(SubscriptionEvent {
            event_name: meta.event_name,
            user_id: meta.custom_data.and_then(|c| c.user_id),
            subscription_id,
            customer_id: attributes.customer_id.map(|id| id.to_string()),
            price_id: attributes.variant_id.map(|id| id.to_string()),
            renews_at: attributes.renews_at,
            ends_at: attributes.ends_at,
        })
    }
}

fn id_to_string(id: Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
