//! # Passgate Core
//!
//! Core types, errors, and utilities for the Passgate API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: Secure password hashing and verification
//! - [`clock`]: Injectable time source for expiry checks
//!
//! # Example
//!
//! ```ignore
//! use passgate_core::errors::AppError;
//! use passgate_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//!
//! let hash = hash_password("secure_password", 12)?;
//! verify_password("secure_password", &hash)?;
//! ```

pub mod clock;
pub mod errors;
pub mod password;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::AppError;
pub use password::{PasswordError, hash_password, verify_password};
