//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! CHIRAG_ADMIN_PASSWORD=... chirag-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Promote an existing customer account
//! chirag-cli admin promote -e someone@example.com
//! ```

use chirag_core::{Email, UserId, UserRole};
use chirag_storefront::db::RepositoryError;
use chirag_storefront::db::users::UserRepository;
use chirag_storefront::services::auth::{AuthError, AuthService};
use thiserror::Error;

use super::{ConnectError, admin_password, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No account with email: {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a new admin user.
///
/// The password is read from `CHIRAG_ADMIN_PASSWORD` so it never appears in
/// shell history.
///
/// # Errors
///
/// Returns an error if the password variable is missing, the input fails
/// account validation, or the email is already registered.
pub async fn create_user(email: &str, name: &str) -> Result<UserId, AdminError> {
    let password = admin_password()?;
    let pool = connect().await?;

    tracing::info!("Creating admin user: {}", email);

    let user = AuthService::new(&pool)
        .create_user(name, email, &password, &password, UserRole::Admin)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Give an existing account the admin role.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if no account has this email.
pub async fn promote(email: &str) -> Result<UserId, AdminError> {
    let parsed = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&parsed, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownUser(email.to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!("Promoted {} to admin (ID: {})", user.email, user.id);
    Ok(user.id)
}
