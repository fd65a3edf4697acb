//! Repository trait for short link data access.

use crate::domain::destination::Channel;
use crate::domain::entities::{Link, LinkMetadata, NewLink, ResolvedLink};
use crate::domain::resolver::CanonicalDomain;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links and their click counters.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Returns true if any link already uses `code`.
    async fn code_exists(&self, code: &str) -> Result<bool, AppError>;

    /// Exact lookup on the `(domain, code)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_domain_and_code(
        &self,
        domain: &str,
        code: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Loads a link with its project and bound apps in one query.
    ///
    /// Custom domains only match when a verified custom domain row for that
    /// host belongs to the project's owner. `Ok(None)` is the ordinary
    /// not-found outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_for_redirect(
        &self,
        domain: &CanonicalDomain,
        code: &str,
    ) -> Result<Option<ResolvedLink>, AppError>;

    /// Atomically adds one to the total and to the channel's counter.
    ///
    /// Returns `Ok(false)` if the link no longer exists.
    async fn increment_clicks(&self, link_id: i64, channel: Channel) -> Result<bool, AppError>;

    /// Writes fetched metadata only while the link has none.
    ///
    /// Returns `Ok(false)` when metadata was already present.
    async fn fill_metadata_if_absent(
        &self,
        link_id: i64,
        metadata: LinkMetadata,
    ) -> Result<bool, AppError>;

    /// Owner edit: sets metadata unconditionally on a link of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or belongs
    /// to another user.
    async fn update_metadata(
        &self,
        user_id: &str,
        link_id: i64,
        metadata: LinkMetadata,
    ) -> Result<Link, AppError>;

    /// Owner edit: points a link of `user_id` at a new destination and
    /// replaces its metadata.
    ///
    /// Code, domain and counters are kept.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or belongs
    /// to another user.
    async fn update_destination(
        &self,
        user_id: &str,
        link_id: i64,
        long_url: &str,
        metadata: LinkMetadata,
    ) -> Result<Link, AppError>;

    /// Every link across the projects of `user_id`, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Link>, AppError>;

    /// Deletes a link owned by `user_id`. Returns `Ok(false)` if nothing matched.
    async fn delete(&self, user_id: &str, link_id: i64) -> Result<bool, AppError>;

    /// Counts links across every project of `user_id`.
    async fn count_by_user(&self, user_id: &str) -> Result<i64, AppError>;
}
