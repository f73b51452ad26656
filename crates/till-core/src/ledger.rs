//! # Sale Ledger
//!
//! Append-only record of committed sales. Only checkout appends; nothing
//! edits or deletes an entry.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult, Entity};
use crate::money::Money;
use crate::types::Sale;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    sales: Vec<Sale>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Rebuilds the ledger from its persisted list.
    pub fn restore(sales: Vec<Sale>) -> Self {
        Ledger { sales }
    }

    pub(crate) fn append(&mut self, sale: Sale) {
        self.sales.push(sale);
    }

    /// All sales, oldest first.
    pub fn list(&self) -> &[Sale] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn get(&self, id: &str) -> CoreResult<&Sale> {
        self.sales
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(Entity::Sale, id))
    }

    /// Sales with `from <= created_at < to`.
    pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| s.created_at >= from && s.created_at < to)
            .collect()
    }

    /// Sales rung up under a shift.
    pub fn for_shift(&self, shift_id: &str) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| s.shift_id.as_deref() == Some(shift_id))
            .collect()
    }

    /// Sales made with no shift open.
    pub fn unattributed(&self) -> Vec<&Sale> {
        self.sales.iter().filter(|s| !s.is_attributed()).collect()
    }

    /// Σ sale totals.
    pub fn total(&self) -> Money {
        self.sales.iter().map(|s| s.total).sum()
    }

    /// Next receipt number for `date`: `YYYYMMDD-NNNN`, counting that day's
    /// sales from 1.
    pub fn next_receipt_number(&self, date: NaiveDate) -> String {
        let prefix = date.format("%Y%m%d").to_string();
        let issued = self
            .sales
            .iter()
            .filter(|s| s.receipt_number.starts_with(&prefix))
            .count();
        format!("{prefix}-{:04}", issued + 1)
    }
}
