//! CLI subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] copperline_server::services::auth::AuthError),

    #[error("Repository error: {0}")]
    Repository(#[from] copperline_server::db::RepositoryError),

    #[error("No user with email {0}")]
    UnknownUser(String),
}

/// Connect to the database named by `COPPERLINE_DATABASE_URL` (falling
/// back to `DATABASE_URL`).
///
/// # Errors
///
/// Returns an error if neither variable is set or the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("COPPERLINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("COPPERLINE_DATABASE_URL"))?;

    let pool = copperline_server::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
