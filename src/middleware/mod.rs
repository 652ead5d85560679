//! Request middleware and extractors.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. [`auth::require_auth`] validates the access token through the
//!    authentication service and stores an [`auth::AuthenticatedUser`] in the
//!    request extensions
//! 3. Handlers read it with the [`auth::AuthUser`] extractor
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn get_profile(auth_user: AuthUser) -> impl IntoResponse {
//!     let user_id = auth_user.user_id();
//!     // ...
//! }
//! ```

pub mod auth;
