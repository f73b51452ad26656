//! # Persistence Documents
//!
//! The engine never performs I/O. State-changing commands return the
//! documents they touched and the host hands them to a store.
//!
//! ## Document Keys
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │  key             │  body                                                │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │  catalog         │  [Product]                                           │
//! │  ledger          │  [Sale]                                              │
//! │  shift-current   │  Shift (state = open); deleted when no shift is open │
//! │  shift-history   │  [Shift] (state = closed)                            │
//! │  session-user    │  Actor; deleted on sign-out                          │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;

use crate::types::{Actor, Product, Sale, Shift};

/// A persisted document key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Catalog,
    Ledger,
    ShiftCurrent,
    ShiftHistory,
    SessionUser,
}

impl StoreKey {
    pub const ALL: [StoreKey; 5] = [
        StoreKey::Catalog,
        StoreKey::Ledger,
        StoreKey::ShiftCurrent,
        StoreKey::ShiftHistory,
        StoreKey::SessionUser,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Catalog => "catalog",
            StoreKey::Ledger => "ledger",
            StoreKey::ShiftCurrent => "shift-current",
            StoreKey::ShiftHistory => "shift-history",
            StoreKey::SessionUser => "session-user",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Catalog(Vec<Product>),
    Ledger(Vec<Sale>),
    ShiftCurrent(Shift),
    ShiftHistory(Vec<Shift>),
    SessionUser(Actor),
}

impl Document {
    pub fn key(&self) -> StoreKey {
        match self {
            Document::Catalog(_) => StoreKey::Catalog,
            Document::Ledger(_) => StoreKey::Ledger,
            Document::ShiftCurrent(_) => StoreKey::ShiftCurrent,
            Document::ShiftHistory(_) => StoreKey::ShiftHistory,
            Document::SessionUser(_) => StoreKey::SessionUser,
        }
    }

    /// Serializes the body alone, without any variant tag.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One change to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Upsert a document under its key.
    Put(Document),
    /// Remove whatever is stored under the key.
    Delete(StoreKey),
}

impl Write {
    pub fn key(&self) -> StoreKey {
        match self {
            Write::Put(doc) => doc.key(),
            Write::Delete(key) => *key,
        }
    }
}

/// What a state-changing command produced: its value plus the writes that
/// make the store match the engine again.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Outcome<T> {
    pub value: T,
    pub writes: Vec<Write>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, writes: Vec<Write>) -> Self {
        Outcome { value, writes }
    }

    /// An outcome that touches nothing persisted.
    pub fn pure(value: T) -> Self {
        Outcome {
            value,
            writes: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            writes: self.writes,
        }
    }
}

/// Everything the engine restores from at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub catalog: Vec<Product>,
    pub ledger: Vec<Sale>,
    pub shift_current: Option<Shift>,
    pub shift_history: Vec<Shift>,
    pub session_user: Option<Actor>,
}

impl Snapshot {
    /// Applies writes in order, the way a store would.
    pub fn apply(&mut self, writes: &[Write]) {
        for write in writes {
            match write.clone() {
                Write::Put(Document::Catalog(products)) => self.catalog = products,
                Write::Put(Document::Ledger(sales)) => self.ledger = sales,
                Write::Put(Document::ShiftCurrent(shift)) => self.shift_current = Some(shift),
                Write::Put(Document::ShiftHistory(shifts)) => self.shift_history = shifts,
                Write::Put(Document::SessionUser(actor)) => self.session_user = Some(actor),
                Write::Delete(StoreKey::Catalog) => self.catalog.clear(),
                Write::Delete(StoreKey::Ledger) => self.ledger.clear(),
                Write::Delete(StoreKey::ShiftCurrent) => self.shift_current = None,
                Write::Delete(StoreKey::ShiftHistory) => self.shift_history.clear(),
                Write::Delete(StoreKey::SessionUser) => self.session_user = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::Role;

    #[test]
    fn test_keys() {
        let names: Vec<_> = StoreKey::ALL.iter().map(StoreKey::as_str).collect();
        assert_eq!(
            names,
            ["catalog", "ledger", "shift-current", "shift-history", "session-user"]
        );
    }

    #[test]
    fn test_document_body_is_untagged() {
        let actor = Actor::new("1", "admin", "Administrador", Role::Admin);
        let json = Document::SessionUser(actor).to_json().unwrap();
        assert!(json.starts_with("{\"id\":\"1\""));

        let json = Document::Catalog(Vec::new()).to_json().unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_snapshot_apply() {
        let mut snapshot = Snapshot::default();
        let shift = Shift::open(Money::from_minor(100), "Cajero");

        snapshot.apply(&[Write::Put(Document::ShiftCurrent(shift.clone()))]);
        assert_eq!(snapshot.shift_current, Some(shift));

        snapshot.apply(&[Write::Delete(StoreKey::ShiftCurrent)]);
        assert!(snapshot.shift_current.is_none());
    }
}
