//! Payments provider webhook: signature check and subscription state updates.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::SubscriptionUpdate;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signature header is missing")]
    Missing,

    #[error("Signature is not valid hex")]
    Malformed,

    #[error("Signature does not match payload")]
    Mismatch,
}

/// Checks a hex HMAC-SHA256 `signature` of `payload` in constant time.
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::Missing)?;
    let expected = hex::decode(signature).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// A subscription lifecycle event, already authenticated and decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionEvent {
    pub event_name: String,
    pub user_id: Option<String>,
    pub subscription_id: Option<String>,
    pub customer_id: Option<String>,
    pub price_id: Option<String>,
    pub renews_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Applies payments provider events to users' subscription state.
pub struct SubscriptionService<U: UserRepository> {
    user_repository: Arc<U>,
    webhook_secret: Option<String>,
}

impl<U: UserRepository> SubscriptionService<U> {
    pub fn new(user_repository: Arc<U>, webhook_secret: Option<String>) -> Self {
        Self {
            user_repository,
            webhook_secret,
        }
    }

    /// Authenticates a raw webhook body.
    ///
    /// # Errors
    ///
    /// - [`AppError::Internal`] if no webhook secret is configured
    /// - [`AppError::Unauthorized`] if the signature is missing or wrong
    pub fn authenticate(&self, payload: &[u8], signature: Option<&str>) -> Result<(), AppError> {
        let Some(secret) = self.webhook_secret.as_deref() else {
            tracing::error!("Subscription webhook received but WEBHOOK_SECRET is not set");
            return Err(AppError::internal(
                "Webhook secret not configured",
                json!({}),
            ));
        };

        verify_signature(secret, payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Rejected subscription webhook");
            AppError::unauthorized("Invalid signature", json!({ "reason": e.to_string() }))
        })
    }

    /// Applies one event.
    ///
    /// Unknown users and unhandled event types are logged and acknowledged.
    pub async fn process(&self, event: SubscriptionEvent) -> Result<(), AppError> {
        let Some(user_id) = event.user_id.as_deref() else {
            tracing::warn!(event = %event.event_name, "Webhook event without user id");
            return Ok(());
        };

        if self.user_repository.find_by_id(user_id).await?.is_none() {
            tracing::error!(user_id, event = %event.event_name, "Webhook user not found");
            return Ok(());
        }

        match event.event_name.as_str() {
            "subscription_created" => {
                let subscription_id = event.subscription_id.clone().ok_or_else(|| {
                    AppError::bad_request("Missing subscription id", json!({}))
                })?;
                let update = SubscriptionUpdate {
                    subscription_id,
                    customer_id: event.customer_id,
                    price_id: event.price_id,
                    current_period_end: event.renews_at,
                };
                self.user_repository.apply_subscription(user_id, update).await?;
                tracing::info!(user_id, "Subscription created");
            }
            "subscription_updated" => {
                let Some(period_end) = event.renews_at.or(event.ends_at) else {
                    tracing::debug!(user_id, "Subscription update without period end ignored");
                    return Ok(());
                };
                self.user_repository.set_period_end(user_id, period_end).await?;
                tracing::info!(user_id, %period_end, "Subscription period updated");
            }
            "subscription_expired" => {
                self.user_repository.set_period_end(user_id, Utc::now()).await?;
                tracing::info!(user_id, "Subscription expired");
            }
            "order_created" => {
                tracing::debug!(user_id, "Order created");
            }
            other => {
                tracing::info!(event = other, "Unhandled webhook event");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::domain::repositories::MockUserRepository;

    const SECRET: &str = "whsec_test";

    fn sign(payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn existing_user() -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            Ok(Some(User {
                id: id.to_string(),
                email: None,
                name: None,
                subscription_id: None,
                customer_id: None,
                price_id: None,
                current_period_end: None,
                created_at: Utc::now(),
            }))
        });
        users
    }

    fn event(name: &str) -> SubscriptionEvent {
        SubscriptionEvent {
            event_name: name.to_string(),
            user_id: Some("user_1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_verify_signature() {
        let body = br#"{"meta":{}}"#;
        let signature = sign(body);

        assert_eq!(verify_signature(SECRET, body, Some(&signature)), Ok(()));
        assert_eq!(
            verify_signature(SECRET, body, Some(&signature.to_uppercase())),
            Ok(())
        );
        assert_eq!(
            verify_signature(SECRET, b"tampered", Some(&signature)),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature(SECRET, body, Some("zz")),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(SECRET, body, None),
            Err(SignatureError::Missing)
        );
    }

    #[test]
    fn test_authenticate_without_secret_is_internal_error() {
        let service = SubscriptionService::new(Arc::new(MockUserRepository::new()), None);

        let result = service.authenticate(b"{}", Some("00"));

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[test]
    fn test_authenticate_bad_signature_is_unauthorized() {
        let service =
            SubscriptionService::new(Arc::new(MockUserRepository::new()), Some(SECRET.into()));

        let result = service.authenticate(b"{}", Some(&sign(b"other")));

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_subscription_created_stores_subscription() {
        let renews_at = Utc::now() + chrono::Duration::days(30);

        let mut users = existing_user();
        users
            .expect_apply_subscription()
            .withf(move |user_id, update| {
                user_id == "user_1"
                    && update.subscription_id == "sub_9"
                    && update.customer_id.as_deref() == Some("42")
                    && update.price_id.as_deref() == Some("7")
                    && update.current_period_end == Some(renews_at)
            })
            .times(1)
            .returning(|_, _| Ok(true));

        let service = SubscriptionService::new(Arc::new(users), Some(SECRET.into()));

        service
            .process(SubscriptionEvent {
                subscription_id: Some("sub_9".to_string()),
                customer_id: Some("42".to_string()),
                price_id: Some("7".to_string()),
                renews_at: Some(renews_at),
                ..event("subscription_created")
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subscription_expired_ends_period_now() {
        let before = Utc::now();

        let mut users = existing_user();
        users
            .expect_set_period_end()
            .withf(move |user_id, end| user_id == "user_1" && *end >= before)
            .times(1)
            .returning(|_, _| Ok(true));

        let service = SubscriptionService::new(Arc::new(users), Some(SECRET.into()));

        service.process(event("subscription_expired")).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_user_is_acknowledged() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users.expect_apply_subscription().never();

        let service = SubscriptionService::new(Arc::new(users), Some(SECRET.into()));

        assert!(service.process(event("subscription_created")).await.is_ok());
    }

    #[tokio::test]
    async fn test_unhandled_event_is_acknowledged() {
        let mut users = existing_user();
        users.expect_apply_subscription().never();
        users.expect_set_period_end().never();

        let service = SubscriptionService::new(Arc::new(users), Some(SECRET.into()));

        assert!(service.process(event("order_created")).await.is_ok());
        assert!(service.process(event("license_key_created")).await.is_ok());
    }
}
