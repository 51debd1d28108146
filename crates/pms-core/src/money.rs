//! # Money — Decimal Monetary Amounts
//!
//! [`Money`] wraps `rust_decimal::Decimal`. The night audit sums booking
//! revenue into its statistics block; floating point would accumulate
//! rounding error across a day's postings, so floats are rejected at the
//! type level — there is no `From<f64>`.

use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A monetary amount with fixed decimal precision.
///
/// Currency is uniform across a property and tracked by the excluded
/// invoicing collaborator, so `Money` carries the amount only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create an amount from a decimal value.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse an amount from a decimal string (e.g. `"150.00"`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] if the string is not a valid
    /// decimal.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Decimal::from_str(s)
            .map(Self)
            .map_err(|_| CoreError::InvalidAmount(s.to_string()))
    }

    /// Access the underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Round to the given number of decimal places.
    pub fn round_dp(&self, dp: u32) -> Self {
        Self(self.0.round_dp(dp))
    }
}

impl From<i64> for Money {
    fn from(whole: i64) -> Self {
        Self(Decimal::from(whole))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
