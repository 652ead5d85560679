//! Feature modules.
//!
//! - [`auth`]: registration, login, refresh token rotation and logout
//! - [`users`]: the authenticated user's profile

pub mod auth;
pub mod users;
