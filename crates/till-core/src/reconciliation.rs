//! # Reconciliation
//!
//! Compares the cash that should be in the drawer against what was counted.
//!
//! ```text
//! expected    = opening_float + sales_total
//! discrepancy = counted_cash - expected
//!
//!   discrepancy == 0  ──► Exact
//!   discrepancy  > 0  ──► Over   (more cash than expected)
//!   discrepancy  < 0  ──► Short  (cash missing)
//! ```
//!
//! Either subtraction or addition leaving the `Money` range is an
//! `Overflow`, never a wrapped figure.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// How the counted cash compares to the expected amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Classification {
    Exact,
    Over,
    Short,
}

impl Classification {
    fn of(discrepancy: Money) -> Self {
        if discrepancy.is_zero() {
            Classification::Exact
        } else if discrepancy.is_positive() {
            Classification::Over
        } else {
            Classification::Short
        }
    }
}

/// Result of a drawer count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Reconciliation {
    pub expected: Money,
    pub discrepancy: Money,
    pub classification: Classification,
}

/// Reconciles a drawer count.
///
/// ```rust
/// use till_core::money::Money;
/// use till_core::reconciliation::{reconcile, Classification};
///
/// let r = reconcile(
///     Money::from_minor(50000),
///     Money::from_minor(9000),
///     Money::from_minor(58500),
/// )
/// .unwrap();
/// assert_eq!(r.expected.minor(), 59000);
/// assert_eq!(r.discrepancy.minor(), -500);
/// assert_eq!(r.classification, Classification::Short);
/// ```
pub fn reconcile(
    opening_float: Money,
    sales_total: Money,
    counted_cash: Money,
) -> Result<Reconciliation, ValidationError> {
    let expected = opening_float
        .checked_add(sales_total)
        .ok_or_else(|| overflow("expected cash"))?;
    let discrepancy = counted_cash
        .checked_sub(expected)
        .ok_or_else(|| overflow("cash discrepancy"))?;

    Ok(Reconciliation {
        expected,
        discrepancy,
        classification: Classification::of(discrepancy),
    })
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        let r = reconcile(
            Money::from_minor(50000),
            Money::from_minor(2500),
            Money::from_minor(52500),
        )
        .unwrap();
        assert_eq!(r.expected, Money::from_minor(52500));
        assert!(r.discrepancy.is_zero());
        assert_eq!(r.classification, Classification::Exact);
    }

    #[test]
    fn test_over() {
        let r = reconcile(Money::zero(), Money::from_minor(1000), Money::from_minor(1200)).unwrap();
        assert_eq!(r.discrepancy, Money::from_minor(200));
        assert_eq!(r.classification, Classification::Over);
    }

    #[test]
    fn test_short() {
        let r = reconcile(
            Money::from_minor(50000),
            Money::from_minor(9000),
            Money::from_minor(58500),
        )
        .unwrap();
        assert_eq!(r.expected, Money::from_minor(59000));
        assert_eq!(r.discrepancy, Money::from_minor(-500));
        assert_eq!(r.classification, Classification::Short);
    }

    #[test]
    fn test_out_of_range_is_overflow() {
        let max = Money::from_minor(i64::MAX);

        assert_eq!(
            reconcile(max, Money::from_minor(1), Money::zero()),
            Err(ValidationError::Overflow {
                field: "expected cash".to_string()
            })
        );
        assert_eq!(
            reconcile(max, Money::zero(), Money::from_minor(-2)),
            Err(ValidationError::Overflow {
                field: "cash discrepancy".to_string()
            })
        );

        let r = reconcile(max, Money::zero(), Money::zero()).unwrap();
        assert_eq!(r.discrepancy, Money::from_minor(-i64::MAX));
        assert_eq!(r.classification, Classification::Short);
    }
}
