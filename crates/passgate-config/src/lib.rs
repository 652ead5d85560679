//! # Passgate Config
//!
//! Configuration types for the Passgate API.
//!
//! Each structure is loaded once from environment variables at startup and
//! then passed explicitly to the components that need it:
//!
//! - [`jwt`]: Signing secret and token lifetimes
//! - [`password`]: bcrypt work factor
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: Listen address
//!
//! # Example
//!
//! ```ignore
//! use passgate_config::{JwtConfig, PasswordConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let password_config = PasswordConfig::from_env()?;
//! ```

pub mod cors;
pub mod jwt;
pub mod password;
pub mod server;

use thiserror::Error;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use password::PasswordConfig;
pub use server::ServerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Parses an optional numeric environment variable, falling back to `default`
/// when it is unset.
pub(crate) fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
