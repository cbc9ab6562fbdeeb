//! Keydeck API
//!
//! A multi-tenant API key management service with support for:
//! - Cookie-session registration and login (Argon2 password hashing)
//! - Per-user API key CRUD with a per-user key cap
//! - Playground key validation issuing short-lived sessions
//! - Fixed-window rate limiting on authentication endpoints

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::middleware::CookiePolicy;
use api::state::AppState;
use config::StorageBackend;
use infrastructure::{
    api_key::{ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository},
    rate_limit::RateLimiter,
    user::{Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService},
};
use tracing::info;

/// Create the application state with all services initialized
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    info!("Storage backend: {:?}", config.storage.backend);

    let password_hasher = Arc::new(Argon2Hasher::new());

    let (user_service, api_key_service): (
        Arc<dyn api::state::UserServiceTrait>,
        Arc<dyn api::state::ApiKeyServiceTrait>,
    ) = match config.storage.backend {
        StorageBackend::Postgres => {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

            info!("Connecting to PostgreSQL...");
            let pg_pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
            let api_key_repository = Arc::new(PostgresApiKeyRepository::new(pg_pool));

            (
                Arc::new(UserService::new(user_repository, password_hasher)),
                Arc::new(ApiKeyService::new(api_key_repository)),
            )
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data will not survive a restart");

            let user_repository = Arc::new(InMemoryUserRepository::new());
            let api_key_repository = Arc::new(InMemoryApiKeyRepository::new());

            (
                Arc::new(UserService::new(user_repository, password_hasher)),
                Arc::new(ApiKeyService::new(api_key_repository)),
            )
        }
    };

    let rate_limiter = Arc::new(RateLimiter::new());
    let cookies = CookiePolicy::new(config.environment.is_production());

    Ok(AppState::new(
        user_service,
        api_key_service,
        rate_limiter,
        cookies,
    ))
}
