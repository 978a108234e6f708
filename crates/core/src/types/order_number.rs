//! Human-readable order numbers.
//!
//! Format: `CJ-<base36 millisecond timestamp>-<4 random characters>`, for
//! example `CJ-M3K9Q2ZB-7HXD`. The timestamp part keeps numbers roughly
//! sortable and distinct across time; the random suffix separates orders
//! created in the same millisecond. Uniqueness is still enforced by the
//! database constraint, and callers retry with a fresh number on collision.

use core::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix shared by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "CJ-";

/// Storage column width (`VARCHAR(20)`).
pub const ORDER_NUMBER_MAX_LEN: usize = 20;

const SUFFIX_LEN: usize = 4;

/// Suffix alphabet without look-alike characters (0/O, 1/I).
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    /// Missing the `CJ-` prefix.
    #[error("order number must start with {ORDER_NUMBER_PREFIX}")]
    MissingPrefix,
    /// Longer than the storage column.
    #[error("order number must be at most {ORDER_NUMBER_MAX_LEN} characters")]
    TooLong,
    /// Contains characters outside `A-Z`, `0-9` and `-`.
    #[error("order number contains invalid characters")]
    InvalidCharacters,
}

/// A customer-facing order number, distinct from the internal order ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a new order number for the current instant.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::rng())
    }

    /// Generate an order number for a given instant using the supplied RNG.
    #[must_use]
    pub fn generate_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

        let mut value = String::with_capacity(ORDER_NUMBER_MAX_LEN);
        value.push_str(ORDER_NUMBER_PREFIX);
        value.push_str(&to_base36(millis));
        value.push('-');
        for _ in 0..SUFFIX_LEN {
            let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
            let c = SUFFIX_ALPHABET.get(idx).copied().unwrap_or(b'X');
            value.push(char::from(c));
        }

        Self(value)
    }

    /// Parse a stored or user-supplied order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not look like an order number.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let s = s.trim().to_ascii_uppercase();
        if !s.starts_with(ORDER_NUMBER_PREFIX) {
            return Err(OrderNumberError::MissingPrefix);
        }
        if s.len() > ORDER_NUMBER_MAX_LEN {
            return Err(OrderNumberError::TooLong);
        }
        if !s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-') {
            return Err(OrderNumberError::InvalidCharacters);
        }
        Ok(Self(s))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_owned();
    }
    let mut buf = Vec::new();
    while n > 0 {
        #[allow(clippy::cast_possible_truncation)] // n % 36 always fits in usize
        let idx = (n % 36) as usize;
        buf.push(DIGITS.get(idx).copied().unwrap_or(b'0'));
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
