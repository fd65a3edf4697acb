//! PostgreSQL implementation of custom domain repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;
use std::sync::Arc;

use super::rows::CustomDomainRow;
use crate::domain::entities::{CustomDomain, DnsChallenge};
use crate::domain::repositories::CustomDomainRepository;
use crate::error::AppError;

/// PostgreSQL repository for custom domains.
///
/// Challenges are stored as a JSONB array and decoded into [`DnsChallenge`] values.
pub struct PgCustomDomainRepository {
    pool: Arc<PgPool>,
}

impl PgCustomDomainRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomDomainRepository for PgCustomDomainRepository {
    async fn create(
        &self,
        user_id: &str,
        domain: &str,
        challenges: Vec<DnsChallenge>,
        verified: bool,
    ) -> Result<CustomDomain, AppError> {
        let row = sqlx::query_as::<_, CustomDomainRow>(
            r#"
            INSERT INTO custom_domains (user_id, domain, challenges, verified)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, domain, challenges, verified, created_at
            "#,
        )
        .bind(user_id)
        .bind(domain)
        .bind(Json(&challenges))
        .bind(verified)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => {
                AppError::conflict("Domain already exists", json!({ "domain": domain }))
            }
            other => other,
        })?;

        Ok(row.into())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<CustomDomain>, AppError> {
        let row = sqlx::query_as::<_, CustomDomainRow>(
            r#"
            SELECT id, user_id, domain, challenges, verified, created_at
            FROM custom_domains
            WHERE domain = $1
            "#,
        )
        .bind(domain)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(CustomDomain::from))
    }

    async fn set_verification(
        &self,
        domain: &str,
        verified: bool,
        challenges: Vec<DnsChallenge>,
    ) -> Result<CustomDomain, AppError> {
        let row = sqlx::query_as::<_, CustomDomainRow>(
            r#"
            UPDATE custom_domains
            SET verified = $2, challenges = $3
            WHERE domain = $1
            RETURNING id, user_id, domain, challenges, verified, created_at
            "#,
        )
        .bind(domain)
        .bind(verified)
        .bind(Json(&challenges))
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(CustomDomain::from)
            .ok_or_else(|| AppError::not_found("Domain not found", json!({ "domain": domain })))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<CustomDomain>, AppError> {
        let rows = sqlx::query_as::<_, CustomDomainRow>(
            r#"
            SELECT id, user_id, domain, challenges, verified, created_at
            FROM custom_domains
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(CustomDomain::from).collect())
    }

    async fn delete(&self, user_id: &str, domain: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let project_id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM projects WHERE custom_domain = $1 FOR UPDATE",
        )
        .bind(domain)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(project_id) = project_id {
            return Err(AppError::conflict(
                "Domain is still used by a project",
                json!({ "domain": domain, "project_id": project_id }),
            ));
        }

        let result = sqlx::query("DELETE FROM custom_domains WHERE user_id = $1 AND domain = $2")
            .bind(user_id)
            .bind(domain)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
