//! Opaque refresh tokens.
//!
//! A refresh token is 32 bytes from the operating system's CSPRNG, hex
//! encoded. Only its SHA-256 digest is persisted; the raw value is handed to
//! the client once and looked up later by hashing what the client presents.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use passgate_config::JwtConfig;
use passgate_core::Clock;

use crate::error::AuthError;

pub const REFRESH_TOKEN_BYTES: usize = 32;

/// A freshly generated refresh token.
///
/// `value` goes to the client; `token_hash` goes to the store.
#[derive(Clone)]
pub struct IssuedRefreshToken {
    pub value: String,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedRefreshToken")
            .field("value", &"<redacted>")
            .field("token_hash", &self.token_hash)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Generates a refresh token valid for `jwt_config.refresh_token_expiry` seconds.
///
/// # Errors
///
/// Returns [`AuthError::Internal`] if the system random source fails or the
/// expiry does not fit in a timestamp.
pub fn issue_refresh_token(
    jwt_config: &JwtConfig,
    clock: &dyn Clock,
) -> Result<IssuedRefreshToken, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Internal(anyhow!("Failed to generate refresh token: {e}")))?;

    let issued_at = clock.now();
    let expires_at = jwt_config
        .refresh_token_ttl()
        .and_then(|ttl| issued_at.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::Internal(anyhow!("Refresh token expiry out of range")))?;

    let value = hex::encode(bytes);

    Ok(IssuedRefreshToken {
        token_hash: hash_refresh_token(&value),
        value,
        issued_at,
        expires_at,
    })
}

/// Digest under which a refresh token value is stored.
pub fn hash_refresh_token(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use passgate_core::ManualClock;
    use std::collections::HashSet;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-at-least-32-characters-long", 900, 604800).unwrap()
    }

    #[test]
    fn test_value_is_hex_encoded_256_bits() {
        let token = issue_refresh_token(&get_test_jwt_config(), &ManualClock::default()).unwrap();
        assert_eq!(token.value.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_expiry_uses_configured_ttl() {
        let clock = ManualClock::default();
        let token = issue_refresh_token(&get_test_jwt_config(), &clock).unwrap();
        assert_eq!(token.issued_at, clock.now());
        assert_eq!(token.expires_at - token.issued_at, Duration::days(7));
    }

    #[test]
    fn test_refresh_outlives_access_token() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let token = issue_refresh_token(&config, &clock).unwrap();
        assert!(token.expires_at > clock.now() + config.access_token_ttl().unwrap());
    }

    #[test]
    fn test_out_of_range_expiry_is_internal_error() {
        let config = JwtConfig {
            secret: "secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: i64::MAX / 2,
        };
        let result = issue_refresh_token(&config, &ManualClock::default());
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_hash_matches_value() {
        let token = issue_refresh_token(&get_test_jwt_config(), &ManualClock::default()).unwrap();
        assert_eq!(token.token_hash, hash_refresh_token(&token.value));
        assert_ne!(token.token_hash, token.value);
    }

    #[test]
    fn test_values_do_not_repeat() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let values: HashSet<String> = (0..1000)
            .map(|_| issue_refresh_token(&config, &clock).unwrap().value)
            .collect();
        assert_eq!(values.len(), 1000);
    }

    #[test]
    fn test_debug_hides_value() {
        let token = issue_refresh_token(&get_test_jwt_config(), &ManualClock::default()).unwrap();
        assert!(!format!("{token:?}").contains(&token.value));
    }
}
