//! Store abstractions consumed by the authentication service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use passgate_auth::AuthError;
use passgate_models::{NewUser, RefreshToken, User};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (user email, token digest) rejected the write.
    #[error("Unique constraint violated")]
    UniqueViolation,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Store failures reach callers as internal faults. Callers that give
/// `UniqueViolation` a domain meaning match on it before converting.
impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Internal(anyhow::Error::new(err).context("Store operation failed"))
    }
}

/// Persists user records keyed by unique email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Inserts a user. Two concurrent inserts with the same email produce
    /// exactly one success and one [`StoreError::UniqueViolation`].
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Persists refresh token records keyed by token digest.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn find_by_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError>;

    async fn create(&self, token: RefreshToken) -> Result<(), StoreError>;

    /// Atomically removes a non-revoked token and returns it.
    ///
    /// Returns `None` when the token is unknown, revoked, or was already
    /// consumed. Of any number of concurrent callers presenting the same
    /// digest, at most one receives `Some`.
    async fn consume(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Consumes `token_hash` and stores `replacement` as one atomic step.
    ///
    /// Returns the consumed record, or `None` when nothing was consumed, in
    /// which case `replacement` is not stored. If storing `replacement`
    /// fails, the presented token stays in place.
    async fn rotate(
        &self,
        token_hash: &str,
        replacement: RefreshToken,
    ) -> Result<Option<RefreshToken>, StoreError>;

    /// Marks a token revoked. Returns whether a non-revoked token was found.
    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Removes every record whose expiry is at or before `now`, revoked or
    /// not. Returns the number of records removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
