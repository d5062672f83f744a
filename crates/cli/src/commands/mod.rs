//! CLI subcommands.

pub mod migrate;
pub mod shop;

use brewpoints_server::config::ConfigError;
use brewpoints_server::db::RepositoryError;
use brewpoints_server::services::auth::AuthError;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Database URL missing or unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Shop input was rejected.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Query failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Connect to the database named by the environment.
async fn connect() -> Result<PgPool, CommandError> {
    let database_url = brewpoints_server::config::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    Ok(pool)
}
