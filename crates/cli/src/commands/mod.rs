//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use chirag_storefront::config::{ConfigError, database_url_from_env};
use sqlx::PgPool;
use thiserror::Error;

/// Env var holding the password for accounts created from the CLI.
pub const ADMIN_PASSWORD_VAR: &str = "CHIRAG_ADMIN_PASSWORD";

/// Errors shared by every command that talks to the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the storefront database named by the environment.
///
/// # Errors
///
/// Returns `ConnectError::Config` if neither `STOREFRONT_DATABASE_URL` nor
/// `DATABASE_URL` is set.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to storefront database...");
    Ok(chirag_storefront::db::create_pool(&database_url).await?)
}

/// Read the admin password from the environment.
///
/// # Errors
///
/// Returns `ConnectError::MissingEnvVar` if the variable is unset or empty.
pub fn admin_password() -> Result<String, ConnectError> {
    std::env::var(ADMIN_PASSWORD_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .ok_or(ConnectError::MissingEnvVar(ADMIN_PASSWORD_VAR))
}
