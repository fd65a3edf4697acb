//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, NewApiToken, TokenRepository};
use crate::error::AppError;
use crate::utils::code_generator::generate_token;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Service for authenticating Public Ingestion API requests via `x-api-key`.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: TokenRepository> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token repository for DB operations
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Hashes a raw token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Resolves a raw token to the stored credential it belongs to.
    ///
    /// On success the token's `last_used_at` is bumped; a failure of that write
    /// is logged and does not fail the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token hash matches no stored token.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<ApiToken, AppError> {
        let token_hash = self.hash_token(token);

        let api_token = self
            .repository
            .find_by_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                AppError::unauthorized("Invalid API key", json!({"reason": "Unknown token"}))
            })?;

        if let Err(e) = self.repository.update_last_used(api_token.id).await {
            tracing::warn!(token_id = api_token.id, error = %e, "Failed to update token last_used_at");
        }

        Ok(api_token)
    }

    /// Issues a new token for `user_id`.
    ///
    /// Returns the stored record and the plaintext secret. The plaintext is
    /// not kept anywhere and cannot be recovered later.
    pub async fn issue_token(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<(ApiToken, String), AppError> {
        let plaintext = generate_token();
        let new_token = NewApiToken {
            user_id: user_id.to_string(),
            name: name.to_string(),
            token_hash: self.hash_token(&plaintext),
            first_four_chars: plaintext.chars().take(4).collect(),
        };

        let token = self.repository.create(new_token).await?;
        Ok((token, plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTokenRepository;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn compute_expected_hash(token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(test_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn stored_token(id: i64, hash: &str) -> ApiToken {
        ApiToken {
            id,
            user_id: "user_1".to_string(),
            name: "ci".to_string(),
            token_hash: hash.to_string(),
            first_four_chars: "abc1".to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let expected_hash = compute_expected_hash("abc123");
        let stored = stored_token(7, &expected_hash);

        mock_repo
            .expect_find_by_hash()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        mock_repo
            .expect_update_last_used()
            .withf(|id| *id == 7)
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let token = service.authenticate("abc123").await.unwrap();

        assert_eq!(token.id, 7);
        assert_eq!(token.user_id, "user_1");
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_by_hash()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_update_last_used().never();

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("wrong").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_survives_last_used_failure() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_by_hash()
            .returning(|hash| Ok(Some(stored_token(1, hash))));
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        assert!(service.authenticate("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_issue_token_stores_hash_and_preview() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo.expect_create().times(1).returning(|new_token| {
            Ok(ApiToken {
                id: 1,
                user_id: new_token.user_id,
                name: new_token.name,
                token_hash: new_token.token_hash,
                first_four_chars: new_token.first_four_chars,
                created_at: Utc::now(),
                last_used_at: None,
            })
        });

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let (token, plaintext) = service.issue_token("user_1", "ci").await.unwrap();

        assert_eq!(token.token_hash, compute_expected_hash(&plaintext));
        assert_ne!(token.token_hash, plaintext);
        assert_eq!(token.first_four_chars, &plaintext[..4]);
    }

    #[test]
    fn test_hash_token_consistency() {
        let service = AuthService::new(Arc::new(MockTokenRepository::new()), test_secret());

        let hash1 = service.hash_token("test-token");
        let hash2 = service.hash_token("test-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, service.hash_token("test-token2"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        let svc1 = AuthService::new(Arc::new(MockTokenRepository::new()), "secret-a".to_string());
        let svc2 = AuthService::new(Arc::new(MockTokenRepository::new()), "secret-b".to_string());

        assert_ne!(svc1.hash_token("token"), svc2.hash_token("token"));
    }
}
