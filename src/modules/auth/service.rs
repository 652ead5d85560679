use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use passgate_auth::{
    AuthError, Claims, hash_refresh_token, issue_access_token, issue_refresh_token,
    validate_access_token,
};
use passgate_config::{JwtConfig, PasswordConfig};
use passgate_core::{Clock, PasswordError, hash_password, verify_password};
use passgate_db::{RefreshTokenStore, StoreError, UserStore};
use passgate_models::{NewUser, RefreshToken, TokenPair, UserResponse};

/// Immutable settings handed to [`AuthService`] at construction.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

/// Registration, login, token rotation and access token validation.
///
/// Holds no per-call state; one instance is shared behind an `Arc` by every
/// request handler.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
    clock: Arc<dyn Clock>,
    // Verified against when the email is unknown so both login failures cost
    // one bcrypt comparison.
    dummy_hash: String,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the login timing hash cannot be
    /// computed with the configured cost.
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("passgate-timing-equalizer", settings.password.cost)
            .map_err(|e| {
                AuthError::Internal(anyhow::Error::new(e).context("Failed to prepare login hash"))
            })?;

        Ok(Self {
            users,
            refresh_tokens,
            settings,
            clock,
            dummy_hash,
        })
    }

    /// Creates a user with a hashed password.
    ///
    /// # Errors
    ///
    /// [`AuthError::EmailInUse`] if the email is taken, including when a
    /// concurrent registration wins the insert.
    #[instrument(skip(self, username, password))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UserResponse, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            warn!("Registration rejected: email already in use");
            return Err(AuthError::EmailInUse);
        }

        let password_hash = self.hash(password).await?;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
        };

        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            Err(StoreError::UniqueViolation) => {
                warn!("Registration rejected: email claimed by a concurrent request");
                return Err(AuthError::EmailInUse);
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Checks credentials and starts a session.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`] after one bcrypt comparison.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self.users.find_by_email(email).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let password_matches = self.verify(password, stored_hash).await?;

        let user = match user {
            Some(user) if password_matches => user,
            _ => {
                warn!("Login failed: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.sweep_expired().await;

        let (pair, refresh) = self.issue_tokens(user.id)?;
        self.refresh_tokens.create(refresh).await?;
        info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new access token and a replacement
    /// refresh token. The presented token is consumed and cannot be reused.
    /// Consuming it and storing the replacement happen atomically, so a
    /// failed rotation leaves the presented token usable.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] if the token is unknown or was already used
    /// - [`AuthError::ExpiredToken`] if the token is past expiry or revoked
    #[instrument(skip_all)]
    pub async fn refresh_access_token(&self, presented: &str) -> Result<TokenPair, AuthError> {
        let token_hash = hash_refresh_token(presented);

        let record = self
            .refresh_tokens
            .find_by_token(&token_hash)
            .await?
            .ok_or_else(|| {
                warn!("Refresh rejected: unknown token");
                AuthError::InvalidToken
            })?;

        // Classified before sweeping so an expired token reports as expired
        let active = record.is_active(self.clock.now());
        self.sweep_expired().await;

        if !active {
            warn!(
                user_id = %record.user_id,
                revoked = record.revoked,
                "Refresh rejected: token expired or revoked"
            );
            return Err(AuthError::ExpiredToken);
        }

        let (pair, replacement) = self.issue_tokens(record.user_id)?;
        let consumed = self
            .refresh_tokens
            .rotate(&token_hash, replacement)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %record.user_id, "Refresh rejected: token already consumed");
                AuthError::InvalidToken
            })?;

        info!(user_id = %consumed.user_id, "Refresh token rotated");
        Ok(pair)
    }

    /// Verifies an access token. Touches no store.
    pub fn validate_token(&self, access_token: &str) -> Result<Claims, AuthError> {
        validate_access_token(access_token, &self.settings.jwt, &*self.clock)
    }

    /// Revokes a refresh token. Succeeds whether or not the token existed.
    #[instrument(skip_all)]
    pub async fn logout(&self, presented: &str) -> Result<(), AuthError> {
        let revoked = self
            .refresh_tokens
            .revoke(&hash_refresh_token(presented))
            .await?;
        debug!(revoked, "Logout processed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<UserResponse>, AuthError> {
        Ok(self.users.find_by_id(user_id).await?.map(UserResponse::from))
    }

    /// Mints an access token and a refresh token. The returned record still
    /// has to be stored before the pair is handed out.
    fn issue_tokens(&self, user_id: Uuid) -> Result<(TokenPair, RefreshToken), AuthError> {
        let access_token = issue_access_token(user_id, &self.settings.jwt, &*self.clock)?;
        let refresh = issue_refresh_token(&self.settings.jwt, &*self.clock)?;

        let record = RefreshToken {
            token_hash: refresh.token_hash,
            user_id,
            issued_at: refresh.issued_at,
            expires_at: refresh.expires_at,
            revoked: false,
        };
        let pair = TokenPair::bearer(
            access_token,
            refresh.value,
            self.settings.jwt.access_token_expiry,
        );

        Ok((pair, record))
    }

    /// Drops expired refresh records, revoked ones included. Failures are
    /// logged and do not fail the calling operation.
    async fn sweep_expired(&self) {
        match self.refresh_tokens.delete_expired(self.clock.now()).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "Expired refresh tokens deleted"),
            Err(e) => warn!(error = %e, "Failed to delete expired refresh tokens"),
        }
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.settings.password.cost;

        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::Internal(anyhow!("Password hashing task failed: {e}")))?
            .map_err(|e| {
                AuthError::Internal(anyhow::Error::new(e).context("Failed to hash password"))
            })
    }

    async fn verify(&self, password: &str, hash: String) -> Result<bool, AuthError> {
        let password = password.to_owned();

        let outcome = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(anyhow!("Password verification task failed: {e}")))?;

        match outcome {
            Ok(()) => Ok(true),
            Err(PasswordError::Mismatch) => Ok(false),
            Err(e) => Err(AuthError::Internal(
                anyhow::Error::new(e).context("Failed to verify password"),
            )),
        }
    }
}
