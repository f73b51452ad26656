//! # Shift Register
//!
//! Tracks the single active cash-drawer session and the closed ones.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                   open(float, cashier)                                  │
//! │      ┌────────┐ ─────────────────────────► ┌────────┐                   │
//! │      │ Closed │                            │  Open  │ ◄──┐              │
//! │      └────────┘ ◄───────────────────────── └────────┘    │              │
//! │          ▲        close(counted, note)         │         │              │
//! │          │                                     └─────────┘              │
//! │          │                                   record_sale(n, total)      │
//! │          │                                                              │
//! │   open while Open     → AlreadyOpen                                     │
//! │   close while Closed  → NotOpen                                         │
//! │   record while Closed → NotOpen                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! At close the reconciliation is computed and frozen on the shift record,
//! which moves from the active slot to history.

use chrono::Utc;

use crate::error::{CoreError, CoreResult, Entity, StateError, ValidationError};
use crate::money::Money;
use crate::reconciliation::{reconcile, Reconciliation};
use crate::types::{Shift, ShiftState};
use crate::validation::validate_cash_amount;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftRegister {
    current: Option<Shift>,
    history: Vec<Shift>,
}

impl ShiftRegister {
    pub fn new() -> Self {
        ShiftRegister::default()
    }

    /// Rebuilds the register from the `shift-current` and `shift-history`
    /// documents.
    ///
    /// ## Errors
    /// `CorruptDocument` if the current shift is not open, carries negative
    /// or out-of-range cash totals, or a history entry is still open.
    pub fn restore(current: Option<Shift>, history: Vec<Shift>) -> CoreResult<Self> {
        if let Some(shift) = &current {
            if !shift.is_open() {
                return Err(CoreError::CorruptDocument {
                    key: "shift-current".to_string(),
                    reason: format!("shift {} is not open", shift.id),
                });
            }
        }

        if let Some(shift) = &current {
            let sound = !shift.opening_float.is_negative()
                && !shift.sales_total.is_negative()
                && shift.opening_float.checked_add(shift.sales_total).is_some();
            if !sound {
                return Err(CoreError::CorruptDocument {
                    key: "shift-current".to_string(),
                    reason: format!("shift {} has impossible cash totals", shift.id),
                });
            }
        }

        if let Some(shift) = history.iter().find(|s| s.is_open()) {
            return Err(CoreError::CorruptDocument {
                key: "shift-history".to_string(),
                reason: format!("shift {} is still open", shift.id),
            });
        }

        Ok(ShiftRegister { current, history })
    }

    /// The open shift, if any.
    pub fn current(&self) -> Option<&Shift> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Closed shifts, oldest first.
    pub fn history(&self) -> &[Shift] {
        &self.history
    }

    /// Finds a shift, open or closed, by identity.
    pub fn get(&self, id: &str) -> CoreResult<&Shift> {
        self.current
            .iter()
            .chain(self.history.iter())
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(Entity::Shift, id))
    }

    /// Cash the drawer should hold now.
    pub fn expected_cash(&self) -> CoreResult<Money> {
        Ok(self.open_shift()?.expected_cash())
    }

    /// Opens a shift.
    pub fn open(&mut self, opening_float: Money, cashier: &str) -> CoreResult<&Shift> {
        if let Some(shift) = &self.current {
            return Err(StateError::AlreadyOpen {
                shift_id: shift.id.clone(),
            }
            .into());
        }
        validate_cash_amount("opening float", opening_float)?;

        Ok(self.current.insert(Shift::open(opening_float, cashier)))
    }

    /// Checks that a sale of `total` can be added to the open shift without
    /// its expected cash leaving the `Money` range.
    pub(crate) fn check_sale(&self, total: Money) -> CoreResult<()> {
        let shift = self.open_shift()?;
        next_sales_total(shift, total).map(|_| ())
    }

    /// Adds sales to the open shift's running totals.
    pub(crate) fn record_sale(&mut self, delta_count: u64, delta_total: Money) -> CoreResult<()> {
        let shift = self.current.as_mut().ok_or(StateError::NotOpen)?;
        let sales_total = next_sales_total(shift, delta_total)?;
        shift.sales_count = shift.sales_count.saturating_add(delta_count);
        shift.sales_total = sales_total;
        Ok(())
    }

    /// Reconciles the open shift against a count without closing it.
    pub fn preview(&self, counted_cash: Money) -> CoreResult<Reconciliation> {
        let shift = self.open_shift()?;
        Ok(reconcile(shift.opening_float, shift.sales_total, counted_cash)?)
    }

    /// Closes the open shift and moves it to history.
    pub fn close(&mut self, counted_cash: Money, note: Option<String>) -> CoreResult<&Shift> {
        let open = self.open_shift()?;
        validate_cash_amount("counted cash", counted_cash)?;
        let reconciliation = reconcile(open.opening_float, open.sales_total, counted_cash)?;

        let mut shift = self.current.take().ok_or(StateError::NotOpen)?;
        shift.reconciliation = Some(reconciliation);
        shift.counted_cash = Some(counted_cash);
        shift.closed_at = Some(Utc::now());
        shift.note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        shift.state = ShiftState::Closed;

        self.history.push(shift);
        self.history.last().ok_or_else(|| StateError::NotOpen.into())
    }

    fn open_shift(&self) -> CoreResult<&Shift> {
        self.current.as_ref().ok_or_else(|| StateError::NotOpen.into())
    }
}

/// The shift's sales total after adding `delta`, provided
/// `opening_float + sales_total` still fits.
fn next_sales_total(shift: &Shift, delta: Money) -> CoreResult<Money> {
    shift
        .sales_total
        .checked_add(delta)
        .filter(|total| shift.opening_float.checked_add(*total).is_some())
        .ok_or_else(|| {
            ValidationError::Overflow {
                field: "shift sales total".to_string(),
            }
            .into()
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
