//! # Money Module
//!
//! `Money`: whole minor units in an `i64`, never floats.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: integers in the smallest currency unit                   │
//! │    price 2500 × 3 = 7500, float 50000 + sales 7500 = 52500              │
//! │    Cash reconciliation compares exact integers, never approximations    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The operators saturate instead of wrapping or panicking. Anything that is
//! committed (sale totals, shift totals, reconciliation) goes through the
//! `checked_*` methods and is rejected when it does not fit.
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_minor(2500);
//! let line = price * 3;
//! assert_eq!(line.minor(), 7500);
//! assert_eq!((line - Money::from_minor(500)).minor(), 7000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: discrepancies at shift close can be negative
/// - **Newtype**: serde writes it as a bare integer
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► CartLine.unit_price ──► SaleLine.line_total ──► Sale.total
///                                                                      │
/// Shift.opening_float + Shift.sales_total ◄────────────────────────────┘
///        │
///        ▼
/// Reconciliation.expected vs counted cash
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// No money.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Magnitude, sign dropped.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let line_total = Money::from_minor(2000).multiply_quantity(3);
    /// assert_eq!(line_total.minor(), 6000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the product does not fit.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(2000).checked_mul(3), Some(Money::from_minor(6000)));
    /// assert_eq!(Money::from_minor(i64::MAX / 2 + 1).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as a partial sum leaves the range.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Formats the amount for display with a currency symbol and a number
    /// of decimal places the minor unit is split into.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(52500).format_with("$", 0), "$52500");
    /// assert_eq!(Money::from_minor(-1099).format_with("$", 2), "-$10.99");
    /// ```
    pub fn format_with(&self, symbol: &str, decimals: u8) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let value = self.0.unsigned_abs();

        if decimals == 0 {
            return format!("{sign}{symbol}{value}");
        }

        let divisor = 10_u64.pow(u32::from(decimals));
        format!(
            "{sign}{symbol}{}.{:0width$}",
            value / divisor,
            value % divisor,
            width = decimals as usize
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display; the console formats with its configured currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$", 0))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        assert_eq!((b - a).minor(), -500);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_minor(6000), Money::from_minor(3000)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.minor(), 9000);
    }

    #[test]
    fn test_checked_arithmetic_at_the_edges() {
        let max = Money::from_minor(i64::MAX);

        assert_eq!(max.checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_sub(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(i64::MAX / 2 + 1).checked_mul(2), None);
        assert_eq!(
            Money::checked_sum([max, Money::from_minor(1), Money::from_minor(-1)]),
            None
        );
        assert_eq!(
            Money::checked_sum([Money::from_minor(6000), Money::from_minor(3000)]),
            Some(Money::from_minor(9000))
        );
    }

    #[test]
    fn test_operators_saturate() {
        let max = Money::from_minor(i64::MAX);

        assert_eq!(max + Money::from_minor(1), max);
        let min = Money::from_minor(i64::MIN);
        assert_eq!(min - Money::from_minor(1), min);
        assert_eq!(min.abs(), max);
        assert_eq!(Money::from_minor(i64::MAX / 2 + 1) * 2, max);

        let mut total = max;
        total += Money::from_minor(5);
        assert_eq!(total, max);
        assert_eq!([max, max].iter().sum::<Money>(), max);
    }

    #[test]
    fn test_format_with() {
        assert_eq!(Money::from_minor(2500).format_with("$", 0), "$2500");
        assert_eq!(Money::from_minor(1099).format_with("$", 2), "$10.99");
        assert_eq!(Money::from_minor(5).format_with("€", 2), "€0.05");
        assert_eq!(Money::from_minor(-500).format_with("$", 0), "-$500");
        assert_eq!(Money::zero().format_with("$", 2), "$0.00");
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
        assert_eq!(Money::from_minor(-750).abs().minor(), 750);
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_minor(52500)).unwrap();
        assert_eq!(json, "52500");
    }
}
