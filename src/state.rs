use std::env;
use std::sync::Arc;

use anyhow::Context;
use passgate_config::{CorsConfig, JwtConfig, PasswordConfig};
use passgate_core::SystemClock;
use passgate_db::{
    InMemoryRefreshTokenStore, InMemoryUserStore, PgRefreshTokenStore, PgUserStore,
    RefreshTokenStore, UserStore, init_db_pool, run_migrations,
};
use tracing::{info, warn};

use crate::modules::auth::{AuthService, AuthSettings};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, cors_config: CorsConfig) -> Self {
        Self { auth, cors_config }
    }
}

/// Builds the application state from the environment.
///
/// Uses PostgreSQL when `DATABASE_URL` is set and in-memory stores otherwise.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let settings = AuthSettings {
        jwt: JwtConfig::from_env().context("Invalid JWT configuration")?,
        password: PasswordConfig::from_env().context("Invalid password configuration")?,
    };

    let (users, refresh_tokens): (Arc<dyn UserStore>, Arc<dyn RefreshTokenStore>) =
        match env::var("DATABASE_URL") {
            Ok(database_url) => {
                let pool = init_db_pool(&database_url)
                    .await
                    .context("Failed to connect to database")?;
                run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                info!("Using PostgreSQL stores");
                (
                    Arc::new(PgUserStore::new(pool.clone())),
                    Arc::new(PgRefreshTokenStore::new(pool)),
                )
            }
            Err(_) => {
                warn!("DATABASE_URL not set, using in-memory stores; data is lost on restart");
                (
                    Arc::new(InMemoryUserStore::new()),
                    Arc::new(InMemoryRefreshTokenStore::new()),
                )
            }
        };

    let auth = AuthService::new(users, refresh_tokens, settings, Arc::new(SystemClock))
        .context("Failed to initialize authentication service")?;

    Ok(AppState::new(Arc::new(auth), CorsConfig::from_env()))
}
