//! Cookie sessions backed by `PostgreSQL`.
//!
//! The store's table (`tower_sessions.session`) is created by the storefront
//! migrations. The cookie carries only the signed session id.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

pub const SESSION_COOKIE_NAME: &str = "chirag_session";

/// Idle sessions are dropped after a week.
const SESSION_IDLE_DAYS: i64 = 7;

/// Session layer with a `PostgreSQL` store and a signed cookie.
///
/// Cookies are marked `Secure` when the public base URL is HTTPS.
///
/// # Panics
///
/// Panics if the session secret is shorter than 64 bytes. Configuration
/// loading rejects such secrets first.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let key = Key::from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(PostgresStore::new(pool.clone()))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
