//! PostgreSQL-backed stores.
//!
//! Email uniqueness is enforced by the `users_email_key` constraint, so
//! concurrent registrations race inside the database rather than in the
//! application. Refresh token consumption is a single conditional
//! `DELETE ... RETURNING`, which gives exactly one winner under concurrency.
//! Rotation runs that statement and the replacement insert in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use passgate_models::{NewUser, RefreshToken, User};
use sqlx::PgPool;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::store::{RefreshTokenStore, StoreError, UserStore};

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Database(err)
}

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, username, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }
}

const CONSUME_REFRESH_TOKEN: &str = "DELETE FROM refresh_tokens
     WHERE token_hash = $1 AND revoked = FALSE
     RETURNING token_hash, user_id, issued_at, expires_at, revoked";

async fn insert_refresh_token<'e, E>(executor: E, token: &RefreshToken) -> Result<(), StoreError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO refresh_tokens (token_hash, user_id, issued_at, expires_at, revoked)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&token.token_hash)
    .bind(token.user_id)
    .bind(token.issued_at)
    .bind(token.expires_at)
    .bind(token.revoked)
    .execute(executor)
    .await
    .map_err(map_write_error)?;

    Ok(())
}

#[derive(Clone, Debug)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn find_by_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT token_hash, user_id, issued_at, expires_at, revoked
             FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn create(&self, token: RefreshToken) -> Result<(), StoreError> {
        insert_refresh_token(&self.pool, &token).await
    }

    async fn consume(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        let token = sqlx::query_as::<_, RefreshToken>(CONSUME_REFRESH_TOKEN)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(token)
    }

    async fn rotate(
        &self,
        token_hash: &str,
        replacement: RefreshToken,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query_as::<_, RefreshToken>(CONSUME_REFRESH_TOKEN)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(consumed) = consumed else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Dropping the transaction on error rolls the delete back
        insert_refresh_token(&mut *tx, &replacement).await?;
        tx.commit().await?;

        Ok(Some(consumed))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE token_hash = $1 AND revoked = FALSE",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
