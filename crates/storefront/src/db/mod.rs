//! Database operations for storefront `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Accounts with argon2 password hashes and a flat role
//! - `tower_sessions.session` - Tower-sessions storage
//! - `addresses` - Address book (at most one default per user)
//! - `categories`, `products` - Catalog; `products.stock` is the inventory
//! - `cart_items` - Server-side cart lines, one per (user, product)
//! - `orders`, `order_items` - Placed orders and their line snapshots
//!
//! Repositories that only read, or that own a single statement, hold a
//! `&PgPool`. Steps of a multi-statement workflow are free functions taking
//! `&mut PgConnection` so the caller decides the transaction boundary.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p chirag-cli -- migrate
//! ```

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Embedded storefront migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, category still in use).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique and foreign-key violations to `Conflict`, everything else
    /// to `Database`.
    pub(crate) fn from_constraint(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(e)
    }
}

/// Whether an error is a unique violation on the named constraint or index.
pub(crate) fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        return db_err.is_unique_violation() && db_err.constraint() == Some(constraint);
    }
    false
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
