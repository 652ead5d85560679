//! Authentication error taxonomy.
//!
//! Domain failures are distinct variants so the HTTP layer can map them to
//! status codes. Everything else is an [`AuthError::Internal`] fault whose
//! detail is logged but never sent to the client.

use passgate_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already in use")]
    EmailInUse,

    /// Unknown email and wrong password are deliberately the same error.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Malformed, badly signed, unknown or already consumed token.
    #[error("Invalid token")]
    InvalidToken,

    /// Well-formed token past its validity window (or revoked).
    #[error("Token has expired")]
    ExpiredToken,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailInUse => AppError::conflict(err),
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::ExpiredToken => {
                AppError::unauthorized(err)
            }
            AuthError::Internal(inner) => AppError::internal(inner),
        }
    }
}
