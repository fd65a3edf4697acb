//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::rows::UserRow;
use crate::domain::entities::{NewUser, SubscriptionUpdate, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn apply_subscription(
        &self,
        user_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET subscription_id = $2,
                customer_id = COALESCE($3, customer_id),
                price_id = COALESCE($4, price_id),
                current_period_end = COALESCE($5, current_period_end)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&update.subscription_id)
        .bind(&update.customer_id)
        .bind(&update.price_id)
        .bind(update.current_period_end)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_period_end(
        &self,
        user_id: &str,
        period_end: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET current_period_end = $2 WHERE id = $1")
            .bind(user_id)
            .bind(period_end)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
