//! Repository trait for projects.

use crate::domain::entities::{NewProject, Project, ProjectApps};
use crate::domain::resolver::CanonicalDomain;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for projects and their app bindings.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgProjectRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the subdomain or custom domain is taken.
    async fn create(&self, new_project: NewProject) -> Result<Project, AppError>;

    /// Finds a project of `user_id` whose subdomain label or custom domain equals `key`.
    async fn find_owned(&self, user_id: &str, key: &str) -> Result<Option<Project>, AppError>;

    /// Finds the project serving `domain` together with its bound apps.
    ///
    /// Same routing rule as the redirect lookup: custom domains must be
    /// verified and owned by the project's user.
    async fn find_with_apps(
        &self,
        domain: &CanonicalDomain,
    ) -> Result<Option<ProjectApps>, AppError>;

    /// Lists projects of `user_id`, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Project>, AppError>;

    /// Deletes a project of `user_id` in one transaction: its links are
    /// deleted and bound apps are unbound, not deleted.
    ///
    /// Returns `Ok(false)` if no such project exists.
    async fn delete(&self, user_id: &str, project_id: i64) -> Result<bool, AppError>;
}
