//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! storefront library, so the CLI and the integration tests run the same set.

use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending storefront migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let migrator = &chirag_storefront::db::MIGRATOR;
    tracing::info!(
        embedded = migrator.iter().count(),
        "Applying storefront migrations"
    );
    migrator.run(&pool).await?;

    tracing::info!("Storefront schema is up to date");
    Ok(())
}
