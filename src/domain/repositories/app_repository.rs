//! Repository trait for Android and iOS app registrations.

use crate::domain::entities::{AndroidApp, IosApp, NewAndroidApp, NewIosApp};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepository: Send + Sync {
    async fn create_android(&self, app: NewAndroidApp) -> Result<AndroidApp, AppError>;

    async fn create_ios(&self, app: NewIosApp) -> Result<IosApp, AppError>;

    /// Binds an Android app of `user_id` to a project, or unbinds it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the app does not belong to the user.
    /// Returns [`AppError::Conflict`] if the project already has an Android app.
    async fn bind_android(
        &self,
        user_id: &str,
        app_id: i64,
        project_id: Option<i64>,
    ) -> Result<AndroidApp, AppError>;

    /// iOS counterpart of [`AppRepository::bind_android`].
    async fn bind_ios(
        &self,
        user_id: &str,
        app_id: i64,
        project_id: Option<i64>,
    ) -> Result<IosApp, AppError>;
}
