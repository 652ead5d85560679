use std::env;
use std::fmt;

use chrono::Duration;

use crate::{ConfigError, parse_var};

/// Access tokens live for 15 minutes unless `JWT_ACCESS_EXPIRY` says otherwise.
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 15 * 60;
/// Refresh tokens live for 7 days unless `JWT_REFRESH_EXPIRY` says otherwise.
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 7 * 24 * 60 * 60;
/// Upper bound for either lifetime: 100 years.
pub const MAX_TOKEN_EXPIRY: i64 = 100 * 365 * 24 * 60 * 60;

/// Signing secret and token lifetimes (in seconds).
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn new(
        secret: impl Into<String>,
        access_token_expiry: i64,
        refresh_token_expiry: i64,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_ACCESS_EXPIRY",
                reason: "must be positive".to_string(),
            });
        }
        if access_token_expiry > MAX_TOKEN_EXPIRY {
            return Err(ConfigError::Invalid {
                name: "JWT_ACCESS_EXPIRY",
                reason: format!("must not exceed {MAX_TOKEN_EXPIRY} seconds"),
            });
        }
        if refresh_token_expiry > MAX_TOKEN_EXPIRY {
            return Err(ConfigError::Invalid {
                name: "JWT_REFRESH_EXPIRY",
                reason: format!("must not exceed {MAX_TOKEN_EXPIRY} seconds"),
            });
        }
        if refresh_token_expiry <= access_token_expiry {
            return Err(ConfigError::Invalid {
                name: "JWT_REFRESH_EXPIRY",
                reason: "must be longer than the access token expiry".to_string(),
            });
        }

        Ok(Self {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        Self::new(
            secret,
            parse_var("JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY)?,
            parse_var("JWT_REFRESH_EXPIRY", DEFAULT_REFRESH_TOKEN_EXPIRY)?,
        )
    }

    pub fn access_token_ttl(&self) -> Option<Duration> {
        Duration::try_seconds(self.access_token_expiry)
    }

    pub fn refresh_token_ttl(&self) -> Option<Duration> {
        Duration::try_seconds(self.refresh_token_expiry)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}
