//! PostgreSQL implementation of app repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use super::rows::{AndroidAppRow, IosAppRow};
use crate::domain::entities::{AndroidApp, IosApp, NewAndroidApp, NewIosApp};
use crate::domain::repositories::AppRepository;
use crate::error::AppError;

pub struct PgAppRepository {
    pool: Arc<PgPool>,
}

impl PgAppRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Binding to a project that belongs to someone else must look like a missing project.
async fn ensure_project_owned(
    pool: &PgPool,
    user_id: &str,
    project_id: Option<i64>,
) -> Result<(), AppError> {
    let Some(project_id) = project_id else {
        return Ok(());
    };

    let owned = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1 AND user_id = $2)",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    if owned {
        Ok(())
    } else {
        Err(AppError::not_found(
            "Project not found",
            json!({ "project_id": project_id }),
        ))
    }
}

#[async_trait]
impl AppRepository for PgAppRepository {
    async fn create_android(&self, app: NewAndroidApp) -> Result<AndroidApp, AppError> {
        let row = sqlx::query_as::<_, AndroidAppRow>(
            r#"
            INSERT INTO android_apps (user_id, package_name, sha256_cert_fingerprints, store_link)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, project_id, package_name, sha256_cert_fingerprints,
                      store_link, created_at
            "#,
        )
        .bind(&app.user_id)
        .bind(&app.package_name)
        .bind(Json(&app.sha256_cert_fingerprints))
        .bind(&app.store_link)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn create_ios(&self, app: NewIosApp) -> Result<IosApp, AppError> {
        let row = sqlx::query_as::<_, IosAppRow>(
            r#"
            INSERT INTO ios_apps (user_id, bundle_id, team_id, store_link)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, project_id, bundle_id, team_id, store_link, created_at
            "#,
        )
        .bind(&app.user_id)
        .bind(&app.bundle_id)
        .bind(&app.team_id)
        .bind(&app.store_link)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn bind_android(
        &self,
        user_id: &str,
        app_id: i64,
        project_id: Option<i64>,
    ) -> Result<AndroidApp, AppError> {
        ensure_project_owned(self.pool.as_ref(), user_id, project_id).await?;

        let row = sqlx::query_as::<_, AndroidAppRow>(
            r#"
            UPDATE android_apps SET project_id = $3
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, project_id, package_name, sha256_cert_fingerprints,
                      store_link, created_at
            "#,
        )
        .bind(user_id)
        .bind(app_id)
        .bind(project_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(AndroidApp::from)
            .ok_or_else(|| AppError::not_found("Android app not found", json!({ "app_id": app_id })))
    }

    async fn bind_ios(
        &self,
        user_id: &str,
        app_id: i64,
        project_id: Option<i64>,
    ) -> Result<IosApp, AppError> {
        ensure_project_owned(self.pool.as_ref(), user_id, project_id).await?;

        let row = sqlx::query_as::<_, IosAppRow>(
            r#"
            UPDATE ios_apps SET project_id = $3
            WHERE id = $2 AND user_id = $1
            RETURNING id, user_id, project_id, bundle_id, team_id, store_link, created_at
            "#,
        )
        .bind(user_id)
        .bind(app_id)
        .bind(project_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(IosApp::from)
            .ok_or_else(|| AppError::not_found("iOS app not found", json!({ "app_id": app_id })))
    }
}
