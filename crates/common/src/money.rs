//! Money amounts held as integer cents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Money amount represented in cents to avoid floating point drift.
///
/// The relational schema and the JSON API both carry prices as decimal
/// numbers, so `Money` converts to and from `f64` at those boundaries and
/// serializes as a plain number (`10.5`, not `{"cents": 1050}`).
///
/// Amounts stay within `±MAX_CENTS`, where every cent value is exact as an
/// `f64`. Arithmetic is checked against that bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Money {
    cents: i64,
}

/// A decimal amount that cannot be held as [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("amount {0} is not a finite value within the supported range")]
pub struct MoneyOutOfRange(pub f64);

impl Money {
    /// Largest magnitude in cents (ten trillion units).
    pub const MAX_CENTS: i64 = 1_000_000_000_000_000;

    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a Money amount from a decimal value, rounding to the nearest cent.
    ///
    /// Values beyond the `i64` range saturate; use [`Money::try_from_f64`]
    /// for untrusted input.
    pub fn from_f64(amount: f64) -> Self {
        Self {
            cents: (amount * 100.0).round() as i64,
        }
    }

    /// Creates a Money amount from a decimal value, rejecting NaN, infinities
    /// and anything beyond `MAX_CENTS`.
    pub fn try_from_f64(amount: f64) -> Result<Self, MoneyOutOfRange> {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents.abs() > Self::MAX_CENTS as f64 {
            return Err(MoneyOutOfRange(amount));
        }
        Ok(Self {
            cents: cents as i64,
        })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the amount as a decimal value.
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Adds two amounts. Returns None if the sum leaves the supported range.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        Self::bounded(self.cents.checked_add(other.cents))
    }

    /// Multiplies by a quantity. Returns None if the product leaves the
    /// supported range.
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        Self::bounded(self.cents.checked_mul(i64::from(quantity)))
    }

    fn bounded(cents: Option<i64>) -> Option<Money> {
        cents
            .filter(|c| c.abs() <= Self::MAX_CENTS)
            .map(Money::from_cents)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyOutOfRange;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Money::try_from_f64(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.as_f64()
    }
}
