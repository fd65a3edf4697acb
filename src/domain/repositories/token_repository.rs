//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// API token entity with metadata.
///
/// Only the keyed hash of the secret is stored, plus its first four
/// characters so owners can tell tokens apart.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub token_hash: String,
    pub first_four_chars: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewApiToken {
    pub user_id: String,
    pub name: String,
    pub token_hash: String,
    pub first_four_chars: String,
}

/// Repository interface for API token management.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_token.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Finds the token whose stored hash equals `token_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError>;

    /// Updates the last_used timestamp for a token.
    ///
    /// Called after successful authentication to track token usage.
    async fn update_last_used(&self, id: i64) -> Result<(), AppError>;

    /// Creates a new API token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a token with the same hash already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, token: NewApiToken) -> Result<ApiToken, AppError>;

    /// Lists all tokens, newest first.
    async fn list(&self) -> Result<Vec<ApiToken>, AppError>;

    /// Deletes a token, preventing further authentication.
    ///
    /// Returns `Ok(false)` if the token does not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
