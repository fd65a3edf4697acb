//! PostgreSQL implementation of project repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{JoinedAppsRow, ProjectRow};
use crate::domain::entities::{NewProject, Project, ProjectApps, ProjectIdentity};
use crate::domain::repositories::ProjectRepository;
use crate::domain::resolver::CanonicalDomain;
use crate::error::AppError;

pub struct PgProjectRepository {
    pool: Arc<PgPool>,
}

impl PgProjectRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectAppsRow {
    #[sqlx(flatten)]
    project: ProjectRow,
    #[sqlx(flatten)]
    apps: JoinedAppsRow,
}

const PROJECT_COLUMNS: &str = "p.id AS p_id, p.user_id AS p_user_id, p.name AS p_name, \
     p.description AS p_description, p.subdomain AS p_subdomain, \
     p.custom_domain AS p_custom_domain, p.created_at AS p_created_at";

const PROJECT_APPS_SELECT: &str = r#"
    SELECT
        p.id AS p_id, p.user_id AS p_user_id, p.name AS p_name,
        p.description AS p_description, p.subdomain AS p_subdomain,
        p.custom_domain AS p_custom_domain, p.created_at AS p_created_at,
        a.id AS a_id, a.user_id AS a_user_id, a.package_name AS a_package_name,
        a.sha256_cert_fingerprints AS a_fingerprints, a.store_link AS a_store_link,
        a.created_at AS a_created_at,
        i.id AS i_id, i.user_id AS i_user_id, i.bundle_id AS i_bundle_id,
        i.team_id AS i_team_id, i.store_link AS i_store_link, i.created_at AS i_created_at
    FROM projects p
    LEFT JOIN android_apps a ON a.project_id = p.id
    LEFT JOIN ios_apps i ON i.project_id = p.id
"#;

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, new_project: NewProject) -> Result<Project, AppError> {
        let (subdomain, custom_domain) = match &new_project.identity {
            ProjectIdentity::Subdomain(label) => (Some(label.as_str()), None),
            ProjectIdentity::CustomDomain(host) => (None, Some(host.as_str())),
        };

        let sql = format!(
            "INSERT INTO projects AS p (user_id, name, description, subdomain, custom_domain) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROJECT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(&new_project.user_id)
            .bind(&new_project.name)
            .bind(&new_project.description)
            .bind(subdomain)
            .bind(custom_domain)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_owned(&self, user_id: &str, key: &str) -> Result<Option<Project>, AppError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p \
             WHERE p.user_id = $1 AND (p.subdomain = $2 OR p.custom_domain = $2)"
        );

        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(user_id)
            .bind(key)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Project::try_from).transpose()
    }

    async fn find_with_apps(
        &self,
        domain: &CanonicalDomain,
    ) -> Result<Option<ProjectApps>, AppError> {
        let row = match domain {
            CanonicalDomain::Subdomain { label, .. } => {
                let sql = format!("{PROJECT_APPS_SELECT} WHERE p.subdomain = $1");
                sqlx::query_as::<_, ProjectAppsRow>(&sql)
                    .bind(label)
                    .fetch_optional(self.pool.as_ref())
                    .await?
            }
            CanonicalDomain::Custom(host) => {
                let sql = format!(
                    "{PROJECT_APPS_SELECT} WHERE p.custom_domain = $1 \
                     AND EXISTS (SELECT 1 FROM custom_domains cd \
                                 WHERE cd.domain = $1 AND cd.user_id = p.user_id AND cd.verified)"
                );
                sqlx::query_as::<_, ProjectAppsRow>(&sql)
                    .bind(host)
                    .fetch_optional(self.pool.as_ref())
                    .await?
            }
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let (android_app, ios_app) = row.apps.into_apps(row.project.p_id);

        Ok(Some(ProjectApps {
            project: row.project.try_into()?,
            android_app,
            ios_app,
        }))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.user_id = $1 ORDER BY p.created_at DESC"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn delete(&self, user_id: &str, project_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM projects WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM links WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE android_apps SET project_id = NULL WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE ios_apps SET project_id = NULL WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }
}
