//! Repository trait for user-owned custom domains.

use crate::domain::entities::{CustomDomain, DnsChallenge};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for custom domain registration and verification state.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCustomDomainRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomDomainRepository: Send + Sync {
    /// Registers a custom domain.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the domain is already registered by anyone.
    async fn create(
        &self,
        user_id: &str,
        domain: &str,
        challenges: Vec<DnsChallenge>,
        verified: bool,
    ) -> Result<CustomDomain, AppError>;

    async fn find_by_domain(&self, domain: &str) -> Result<Option<CustomDomain>, AppError>;

    /// Records the verification state last reported by the domain authority.
    ///
    /// Later reports overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the domain is not registered.
    async fn set_verification(
        &self,
        domain: &str,
        verified: bool,
        challenges: Vec<DnsChallenge>,
    ) -> Result<CustomDomain, AppError>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CustomDomain>, AppError>;

    /// Releases a domain registered by `user_id`. Returns `Ok(false)` if
    /// nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] while a project is still routed by the domain.
    async fn delete(&self, user_id: &str, domain: &str) -> Result<bool, AppError>;
}
