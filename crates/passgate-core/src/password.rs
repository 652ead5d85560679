//! Password hashing and verification using bcrypt.
//!
//! Every call to [`hash_password`] draws a fresh salt, so hashing the same
//! plaintext twice yields two different strings. [`verify_password`] relies on
//! bcrypt's constant-time comparison and fails closed on malformed hashes.

use bcrypt::{hash, verify};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error("Password does not match")]
    Mismatch,
}

/// Hashes `password` with the given bcrypt work factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Checks `password` against a stored bcrypt hash.
///
/// A stored hash that cannot be parsed is reported as [`PasswordError::Mismatch`].
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    match verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(PasswordError::Mismatch),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            Err(PasswordError::Mismatch)
        }
    }
}
