//! Account and login failures.

use thiserror::Error;

use crate::db::RepositoryError;

use super::{MIN_NAME_LENGTH, MIN_PASSWORD_LENGTH};

/// Why a registration, login or profile change was refused.
///
/// Client-side variants carry the message shown in the API response.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidEmail(#[from] chirag_core::EmailError),

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The session refers to an account that has since been removed.
    #[error("Account not found")]
    UserNotFound,

    #[error("An account with this email already exists")]
    UserAlreadyExists,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("Name must be at least {MIN_NAME_LENGTH} characters")]
    NameTooShort,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed")]
    PasswordHash,
}
