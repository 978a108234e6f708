//! Fixed-scale money amounts.
//!
//! Prices, line totals and order totals are stored as `NUMERIC(10, 2)`.
//! [`Money`] keeps the same shape in memory: a non-negative decimal that is
//! always rescaled to exactly two fractional digits.

use core::fmt;
use core::iter::Sum;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of fractional digits carried by every amount.
pub const MONEY_SCALE: u32 = 2;

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Amounts cannot be negative.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount could not be parsed as a decimal.
    #[error("invalid amount: {0}")]
    Invalid(String),
}

/// A non-negative amount with two decimal digits.
///
/// Serialises as a string (`"15999.00"`) and accepts either a JSON string or a
/// JSON number on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a `NUMERIC(10, 2)` column holds: `99999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE));

    /// Create an amount, rounding half away from zero to two digits.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` if the rounded amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        let mut rounded =
            amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            return Err(MoneyError::Negative);
        }
        rounded.set_sign_positive(true);
        rounded.rescale(MONEY_SCALE);
        Ok(Self(rounded))
    }

    /// Create an amount from a whole number of paise.
    #[must_use]
    pub fn from_minor(paise: u32) -> Self {
        Self(Decimal::new(i64::from(paise), MONEY_SCALE))
    }

    /// Parse an amount from its decimal string form.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Invalid` for non-numeric input and
    /// `MoneyError::Negative` for negative amounts.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(|mut v| {
                v.rescale(MONEY_SCALE);
                Self(v)
            })
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(|mut v| {
            v.rescale(MONEY_SCALE);
            Self(v)
        })
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        let mut total = Decimal::ZERO;
        for m in iter {
            total += m.0;
        }
        total.rescale(MONEY_SCALE);
        Self(total)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_always_two() {
        assert_eq!(Money::parse("1000").unwrap().to_string(), "1000.00");
        assert_eq!(Money::parse("12.5").unwrap().to_string(), "12.50");
        assert_eq!(Money::parse("0.005").unwrap().to_string(), "0.01");
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Money::parse("-1"), Err(MoneyError::Negative));
        assert!(matches!(Money::parse("abc"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let m = Money::parse("-0.001").unwrap();
        assert!(m.is_zero());
        assert_eq!(m.to_string(), "0.00");
    }

    #[test]
    fn test_checked_mul_and_sum() {
        let price = Money::parse("1000").unwrap();
        let line = price.checked_mul(2).unwrap();
        assert_eq!(line, Money::parse("2000.00").unwrap());

        let lines = [line, Money::from_minor(50)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.to_string(), "2000.50");
    }

    #[test]
    fn test_max_matches_column_width() {
        assert_eq!(Money::MAX, Money::parse("99999999.99").unwrap());
        assert!(Money::MAX.checked_add(Money::from_minor(1)).unwrap() > Money::MAX);
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("15999").unwrap();
        let from_string: Money = serde_json::from_str("\"15999.00\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"15999.00\"");
        assert!(serde_json::from_str::<Money>("-5").is_err());
    }
}
