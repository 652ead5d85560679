//! # Passgate Models
//!
//! Domain models and DTOs for the Passgate API.
//!
//! - [`users`]: User records and their public projection
//! - [`auth`]: Refresh token records and authentication request/response DTOs

pub mod auth;
pub mod users;

pub use auth::{
    LoginRequest, LogoutRequest, RefreshToken, RefreshTokenRequest, RegisterRequest, TokenPair,
};
pub use users::{NewUser, User, UserResponse};
