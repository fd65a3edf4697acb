//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::{JoinedAppsRow, LinkRow, ProjectRow};
use crate::domain::destination::Channel;
use crate::domain::entities::{Link, LinkMetadata, NewLink, ResolvedLink};
use crate::domain::repositories::LinkRepository;
use crate::domain::resolver::CanonicalDomain;
use crate::error::AppError;

/// PostgreSQL repository for link storage, redirect lookup and click counters.
///
/// Counter updates are single `col = col + 1` statements, so concurrent
/// clicks on the same row serialize on the row lock and none are lost.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RedirectRow {
    #[sqlx(flatten)]
    link: LinkRow,
    #[sqlx(flatten)]
    project: ProjectRow,
    #[sqlx(flatten)]
    apps: JoinedAppsRow,
}

const REDIRECT_SELECT: &str = r#"
    SELECT
        l.id, l.project_id, l.domain, l.code, l.long_url,
        l.meta_title, l.meta_description, l.meta_image, l.android_referrer,
        l.clicks, l.app_store_redirects, l.play_store_redirects, l.general_redirects,
        l.created_at, l.updated_at,
        p.id AS p_id, p.user_id AS p_user_id, p.name AS p_name,
        p.description AS p_description, p.subdomain AS p_subdomain,
        p.custom_domain AS p_custom_domain, p.created_at AS p_created_at,
        a.id AS a_id, a.user_id AS a_user_id, a.package_name AS a_package_name,
        a.sha256_cert_fingerprints AS a_fingerprints, a.store_link AS a_store_link,
        a.created_at AS a_created_at,
        i.id AS i_id, i.user_id AS i_user_id, i.bundle_id AS i_bundle_id,
        i.team_id AS i_team_id, i.store_link AS i_store_link, i.created_at AS i_created_at
    FROM links l
    JOIN projects p ON p.id = l.project_id
    LEFT JOIN android_apps a ON a.project_id = p.id
    LEFT JOIN ios_apps i ON i.project_id = p.id
"#;

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links
                (project_id, domain, code, long_url,
                 meta_title, meta_description, meta_image, android_referrer)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new_link.project_id)
        .bind(&new_link.domain)
        .bind(&new_link.code)
        .bind(&new_link.long_url)
        .bind(&new_link.metadata.title)
        .bind(&new_link.metadata.description)
        .bind(&new_link.metadata.image)
        .bind(&new_link.android_referrer)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM links WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_by_domain_and_code(
        &self,
        domain: &str,
        code: &str,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>("SELECT * FROM links WHERE domain = $1 AND code = $2")
            .bind(domain)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_for_redirect(
        &self,
        domain: &CanonicalDomain,
        code: &str,
    ) -> Result<Option<ResolvedLink>, AppError> {
        let row = match domain {
            CanonicalDomain::Subdomain { label, fqdn } => {
                let sql = format!(
                    "{REDIRECT_SELECT} WHERE l.domain = $1 AND l.code = $2 AND p.subdomain = $3"
                );
                sqlx::query_as::<_, RedirectRow>(&sql)
                    .bind(fqdn)
                    .bind(code)
                    .bind(label)
                    .fetch_optional(self.pool.as_ref())
                    .await?
            }
            CanonicalDomain::Custom(host) => {
                let sql = format!(
                    "{REDIRECT_SELECT} WHERE l.domain = $1 AND l.code = $2 AND p.custom_domain = $1 \
                     AND EXISTS (SELECT 1 FROM custom_domains cd \
                                 WHERE cd.domain = $1 AND cd.user_id = p.user_id AND cd.verified)"
                );
                sqlx::query_as::<_, RedirectRow>(&sql)
                    .bind(host)
                    .bind(code)
                    .fetch_optional(self.pool.as_ref())
                    .await?
            }
        };

        let Some(row) = row else {
            return Ok(None);
        };

        let project_id = row.project.p_id;
        let (android_app, ios_app) = row.apps.into_apps(project_id);

        Ok(Some(ResolvedLink {
            link: row.link.into(),
            project: row.project.try_into()?,
            android_app,
            ios_app,
        }))
    }

    async fn increment_clicks(&self, link_id: i64, channel: Channel) -> Result<bool, AppError> {
        let sql = match channel {
            Channel::Ios => {
                "UPDATE links SET clicks = clicks + 1, app_store_redirects = app_store_redirects + 1 WHERE id = $1"
            }
            Channel::Android => {
                "UPDATE links SET clicks = clicks + 1, play_store_redirects = play_store_redirects + 1 WHERE id = $1"
            }
            Channel::General => {
                "UPDATE links SET clicks = clicks + 1, general_redirects = general_redirects + 1 WHERE id = $1"
            }
        };

        let result = sqlx::query(sql)
            .bind(link_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fill_metadata_if_absent(
        &self,
        link_id: i64,
        metadata: LinkMetadata,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET meta_title = $2, meta_description = $3, meta_image = $4, updated_at = NOW()
            WHERE id = $1
              AND meta_title IS NULL
              AND meta_description IS NULL
              AND meta_image IS NULL
            "#,
        )
        .bind(link_id)
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&metadata.image)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_metadata(
        &self,
        user_id: &str,
        link_id: i64,
        metadata: LinkMetadata,
    ) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links l
            SET meta_title = $3, meta_description = $4, meta_image = $5, updated_at = NOW()
            FROM projects p
            WHERE l.id = $2 AND p.id = l.project_id AND p.user_id = $1
            RETURNING l.*
            "#,
        )
        .bind(user_id)
        .bind(link_id)
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&metadata.image)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))
    }

    async fn update_destination(
        &self,
        user_id: &str,
        link_id: i64,
        long_url: &str,
        metadata: LinkMetadata,
    ) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links l
            SET long_url = $3, meta_title = $4, meta_description = $5, meta_image = $6,
                updated_at = NOW()
            FROM projects p
            WHERE l.id = $2 AND p.id = l.project_id AND p.user_id = $1
            RETURNING l.*
            "#,
        )
        .bind(user_id)
        .bind(link_id)
        .bind(long_url)
        .bind(&metadata.title)
        .bind(&metadata.description)
        .bind(&metadata.image)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.*
            FROM links l
            JOIN projects p ON p.id = l.project_id
            WHERE p.user_id = $1
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn delete(&self, user_id: &str, link_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM links l
            USING projects p
            WHERE l.id = $2 AND p.id = l.project_id AND p.user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_user(&self, user_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM links l
            JOIN projects p ON p.id = l.project_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
