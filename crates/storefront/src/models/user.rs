//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chirag_core::{Email, UserId, UserRole};

/// A storefront account.
///
/// The password hash is never part of this type; it is read separately
/// during login.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lower-cased email address.
    pub email: Email,
    /// Customer or admin.
    pub role: UserRole,
    /// Optional contact number.
    pub phone: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
