//! Repository trait for users and their subscription state.

use crate::domain::entities::{NewUser, SubscriptionUpdate, User};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the id already exists.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Stores subscription identifiers and period end. Returns `Ok(false)` for unknown users.
    async fn apply_subscription(
        &self,
        user_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<bool, AppError>;

    /// Sets only the current period end. Returns `Ok(false)` for unknown users.
    async fn set_period_end(
        &self,
        user_id: &str,
        period_end: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}
