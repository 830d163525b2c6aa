//! Token authentication service
//!
//! Issues signed, time-limited bearer tokens for users who present valid
//! credentials and verifies presented tokens back to the user they name:
//! - Staged verification (structure, algorithm, signature, expiry, subject)
//! - In-memory or PostgreSQL user directory, pluggable clock
//! - HTTP API and command line front ends

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::UserDirectory;
use infrastructure::{
    auth::Authenticator,
    storage::postgres,
    user::{InMemoryUserDirectory, PostgresUserDirectory},
};
use tracing::info;

/// Create application state from an already loaded configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    Ok(AppState::new(create_authenticator(config).await?))
}

/// Build the authenticator over PostgreSQL when a database URL is configured,
/// otherwise over the seeded in-memory directory
pub async fn create_authenticator(config: &AppConfig) -> anyhow::Result<Arc<Authenticator>> {
    let jwt_config = config.auth.jwt_config(config.environment)?;
    let directory = create_user_directory(config).await?;

    let authenticator = Authenticator::new(&jwt_config, directory)?;
    Ok(Arc::new(authenticator))
}

async fn create_user_directory(config: &AppConfig) -> anyhow::Result<Arc<dyn UserDirectory>> {
    match config.database.postgres_config() {
        Some(postgres_config) => {
            let pool = postgres::connect(&postgres_config).await?;
            let directory = PostgresUserDirectory::new(pool);
            directory.ensure_schema().await?;

            info!("Using PostgreSQL user directory");
            Ok(Arc::new(directory))
        }
        None => {
            info!("Using in-memory user directory");
            Ok(Arc::new(InMemoryUserDirectory::seeded()))
        }
    }
}
