//! CLI subcommand implementations.

pub mod migrate;
pub mod user;

use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] fornecedores_api::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] fornecedores_api::services::AuthError),
}

/// Connect to the database named by `API_DATABASE_URL` (or `DATABASE_URL`).
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let database_url = fornecedores_api::config::ApiConfig::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(fornecedores_api::db::create_pool(&database_url).await?)
}
