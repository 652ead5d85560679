//! # Passgate DB
//!
//! Database pool and persistence stores for the Passgate API.
//!
//! The authentication service only talks to the [`UserStore`] and
//! [`RefreshTokenStore`] traits. Two implementations are provided:
//!
//! - [`postgres`]: SQLx/PostgreSQL stores used in production
//! - [`memory`]: Mutex-guarded in-memory stores used by tests and local runs
//!
//! # Example
//!
//! ```ignore
//! use passgate_db::{init_db_pool, run_migrations, PgUserStore, PgRefreshTokenStore};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! let users = PgUserStore::new(pool.clone());
//! let refresh_tokens = PgRefreshTokenStore::new(pool);
//! ```

pub mod memory;
pub mod postgres;
pub mod store;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use memory::{InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PgRefreshTokenStore, PgUserStore};
pub use store::{RefreshTokenStore, StoreError, UserStore};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects a PostgreSQL pool to `database_url`.
///
/// The returned pool is cheaply cloneable and is shared by both stores.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("Connected to database");
    Ok(pool)
}

/// Applies the SQL migrations shipped in the repository's `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
