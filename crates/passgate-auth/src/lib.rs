//! # Passgate Auth
//!
//! Authentication types and token utilities for the Passgate API.
//!
//! This crate provides:
//!
//! - [`claims`]: JWT claim structure carried by access tokens
//! - [`jwt`]: Access token issuance and validation
//! - [`refresh`]: Opaque refresh token generation and hashing
//! - [`error`]: The authentication error taxonomy
//!
//! # Token Types
//!
//! - **Access Token** ([`Claims`]): Short-lived, stateless HS256 JWT
//! - **Refresh Token** ([`IssuedRefreshToken`]): Long-lived opaque random value,
//!   persisted server-side by its SHA-256 digest and rotated on every use
//!
//! # Example
//!
//! ```ignore
//! use passgate_auth::{issue_access_token, validate_access_token};
//! use passgate_config::JwtConfig;
//! use passgate_core::SystemClock;
//!
//! let config = JwtConfig::from_env()?;
//! let token = issue_access_token(user_id, &config, &SystemClock)?;
//! let claims = validate_access_token(&token, &config, &SystemClock)?;
//! assert_eq!(claims.sub, user_id.to_string());
//! ```

pub mod claims;
pub mod error;
pub mod jwt;
pub mod refresh;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use error::AuthError;
pub use jwt::{issue_access_token, validate_access_token};
pub use refresh::{IssuedRefreshToken, hash_refresh_token, issue_refresh_token};
