//! In-memory stores.
//!
//! Each store keeps its records behind a single `Mutex`, so every operation,
//! including the check-then-write in `create`, `consume` and `rotate`, is atomic with
//! respect to other callers. The lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use passgate_models::{NewUser, RefreshToken, User};
use uuid::Uuid;

use crate::store::{RefreshTokenStore, StoreError, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Users keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.values().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = lock(&self.users)?;
        if users.contains_key(&user.email) {
            return Err(StoreError::UniqueViolation);
        }

        let created = User {
            id: user.id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(created.email.clone(), created.clone());
        Ok(created)
    }
}

/// Refresh tokens keyed by digest.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, consumed ones excluded.
    pub fn len(&self) -> usize {
        self.tokens.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn find_by_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        Ok(lock(&self.tokens)?.get(token_hash).cloned())
    }

    async fn create(&self, token: RefreshToken) -> Result<(), StoreError> {
        let mut tokens = lock(&self.tokens)?;
        if tokens.contains_key(&token.token_hash) {
            return Err(StoreError::UniqueViolation);
        }
        tokens.insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn consume(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        match tokens.get(token_hash) {
            Some(token) if !token.revoked => Ok(tokens.remove(token_hash)),
            _ => Ok(None),
        }
    }

    async fn rotate(
        &self,
        token_hash: &str,
        replacement: RefreshToken,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        if !tokens.get(token_hash).is_some_and(|t| !t.revoked) {
            return Ok(None);
        }
        if tokens.contains_key(&replacement.token_hash) {
            return Err(StoreError::UniqueViolation);
        }

        let consumed = tokens.remove(token_hash);
        tokens.insert(replacement.token_hash.clone(), replacement);
        Ok(consumed)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.revoked => {
                token.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut tokens = lock(&self.tokens)?;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}
