//! Exact signed amounts of money.

use std::{fmt, ops::Neg, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money, e.g. a transaction amount or an account balance.
///
/// Positive values represent money flowing into an account and negative
/// values represent money flowing out of it. Amounts are stored as exact
/// decimals so that adding and then subtracting the same amount always gets
/// back the original value.
///
/// Serialized as a JSON string (e.g. `"-12.30"`), deserialized from either a
/// JSON string or a JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// No money at all.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create an amount from an integer mantissa and a decimal scale.
    ///
    /// `Money::new(-1230, 2)` is -12.30.
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    /// The absolute value of the amount.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Whether the amount is strictly less than zero.
    ///
    /// Negative zero is not negative.
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `self + rhs`, or `None` if the result is too large to represent.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self - rhs`, or `None` if the result is too large to represent.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// The total of `amounts`, or `None` if it is too large to represent.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, Money::checked_add)
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

// Stored as TEXT so SQLite never rounds the value through a float.
impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(text) => {
                let text = std::str::from_utf8(text)
                    .map_err(|error| FromSqlError::Other(Box::new(error)))?;

                Money::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))
            }
            ValueRef::Integer(integer) => Ok(Money::from(integer)),
            ValueRef::Real(real) => Decimal::try_from(real)
                .map(Money)
                .map_err(|error| FromSqlError::Other(Box::new(error))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
