//! Access token issuance and validation.
//!
//! Access tokens are HS256 JWTs signed with the server-held secret from
//! [`JwtConfig`]. They carry only the subject and the issue/expiry times, are
//! never persisted, and cannot be revoked before they expire.
//!
//! Expiry is checked against an injected [`Clock`] rather than by
//! `jsonwebtoken` itself, so a token is rejected as soon as `exp <= now` with
//! no leeway, and tests can move time without sleeping.

use anyhow::anyhow;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use passgate_config::JwtConfig;
use passgate_core::Clock;

use crate::claims::Claims;
use crate::error::AuthError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Creates a signed access token for `user_id`.
///
/// The token expires `jwt_config.access_token_expiry` seconds after the
/// clock's current time.
///
/// # Errors
///
/// Returns [`AuthError::Internal`] if encoding fails or the expiry overflows.
pub fn issue_access_token(
    user_id: Uuid,
    jwt_config: &JwtConfig,
    clock: &dyn Clock,
) -> Result<String, AuthError> {
    let now = clock.now().timestamp();
    let exp = now
        .checked_add(jwt_config.access_token_expiry)
        .ok_or_else(|| AuthError::Internal(anyhow!("Access token expiry out of range")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp,
    };

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(anyhow!("Failed to create access token: {e}")))
}

/// Verifies an access token and returns its claims.
///
/// # Errors
///
/// - [`AuthError::InvalidToken`] if the token is malformed, the signature does
///   not verify, `sub`/`exp` are missing, or the subject is not a user ID
/// - [`AuthError::ExpiredToken`] if the signature verifies but `exp <= now`
pub fn validate_access_token(
    token: &str,
    jwt_config: &JwtConfig,
    clock: &dyn Clock,
) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!(error = %e, "Access token rejected");
        AuthError::InvalidToken
    })?;

    if claims.user_id().is_err() {
        debug!("Access token subject is not a user id");
        return Err(AuthError::InvalidToken);
    }

    if claims.exp <= clock.now().timestamp() {
        return Err(AuthError::ExpiredToken);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use passgate_core::{ManualClock, SystemClock};
    use serde::Serialize;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-at-least-32-characters-long", 900, 604800).unwrap()
    }

    fn sign<T: Serialize>(claims: &T, secret: &str) -> String {
        encode(
            &Header::new(ALGORITHM),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_access_token_success() {
        let config = get_test_jwt_config();
        let token = issue_access_token(Uuid::new_v4(), &config, &SystemClock).unwrap();
        assert!(!token.is_empty());
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_validate_round_trip() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, &config, &clock).unwrap();
        let claims = validate_access_token(&token, &config, &clock).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_valid_until_just_before_expiry() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let token = issue_access_token(Uuid::new_v4(), &config, &clock).unwrap();

        clock.advance(Duration::seconds(899));
        assert!(validate_access_token(&token, &config, &clock).is_ok());
    }

    #[test]
    fn test_expired_at_exp() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let token = issue_access_token(Uuid::new_v4(), &config, &clock).unwrap();

        clock.advance(Duration::seconds(900));
        let result = validate_access_token(&token, &config, &clock);
        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_wrong_secret_is_invalid_not_expired() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let token = issue_access_token(Uuid::new_v4(), &config, &clock).unwrap();

        let wrong_config =
            JwtConfig::new("different-secret-key-at-least-32-characters", 900, 604800).unwrap();

        let result = validate_access_token(&token, &wrong_config, &clock);
        assert!(matches!(result, Err(AuthError::InvalidToken)));

        clock.advance(Duration::hours(1));
        let result = validate_access_token(&token, &wrong_config, &clock);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_overflowing_expiry_is_internal_error() {
        let config = JwtConfig {
            secret: "secret".to_string(),
            access_token_expiry: i64::MAX - 1,
            refresh_token_expiry: i64::MAX,
        };
        let result = issue_access_token(Uuid::new_v4(), &config, &SystemClock);
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let config = get_test_jwt_config();
        for token in ["", "invalid-token", "invalid.token.here"] {
            let result = validate_access_token(token, &config, &SystemClock);
            assert!(matches!(result, Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn test_missing_subject_is_invalid() {
        #[derive(Serialize)]
        struct NoSubject {
            iat: i64,
            exp: i64,
        }

        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let now = clock.now().timestamp();
        let token = sign(
            &NoSubject {
                iat: now,
                exp: now + 60,
            },
            &config.secret,
        );

        let result = validate_access_token(&token, &config, &clock);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let now = clock.now().timestamp();
        let token = sign(
            &Claims {
                sub: "alice".to_string(),
                iat: now,
                exp: now + 60,
            },
            &config.secret,
        );

        let result = validate_access_token(&token, &config, &clock);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let config = get_test_jwt_config();
        let clock = ManualClock::default();
        let token = issue_access_token(Uuid::new_v4(), &config, &clock).unwrap();
        let other = issue_access_token(Uuid::new_v4(), &config, &clock).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        let result = validate_access_token(&forged, &config, &clock);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
