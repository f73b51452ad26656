//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │     Shift       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  receipt_number │   │  cashier        │       │
//! │  │  price          │   │  lines (frozen) │   │  opening_float  │       │
//! │  │  category       │   │  total          │   │  sales_count    │       │
//! │  │  stock          │   │  tender/change  │   │  sales_total    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │   ShiftState    │   │     Actor       │       │
//! │  │  Cash           │   │  Open           │   │  role: Admin    │       │
//! │  │  Card           │   │  Closed         │   │        Cashier  │       │
//! │  │  Transfer       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::ValidationResult;
use crate::money::Money;
use crate::reconciliation::Reconciliation;

/// Generates a fresh entity identity.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// Catalog entry that can be put in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the operator and on the receipt.
    pub name: String,

    /// Unit price in the smallest currency unit. Never negative.
    pub price: Money,

    /// Free-form category label ("Bebidas Calientes", "Panadería"...).
    pub category: String,

    /// Units on hand. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }

    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }
}

/// Input for creating a product; the catalog assigns identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub category: String,
    pub stock: i64,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash into the drawer.
    Cash,
    /// Card on an external terminal.
    Card,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    /// Accepts the English names plus the labels the counter staff type.
    fn from_str(s: &str) -> ValidationResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "card" | "credit" | "debit" | "tarjeta" => Ok(PaymentMethod::Card),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            _ => Err(ValidationError::Required {
                field: "payment method (cash, card or transfer)".to_string(),
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Appended once to the ledger and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Human-readable number printed on the receipt.
    pub receipt_number: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Line items frozen at commit time.
    pub lines: Vec<SaleLine>,

    /// Σ(line.unit_price × line.quantity).
    pub total: Money,

    pub payment_method: PaymentMethod,

    pub amount_tendered: Money,

    /// `amount_tendered - total`, never negative.
    pub change: Money,

    /// Shift the sale was rung up under; `None` for privileged sales made
    /// while no shift was open.
    pub shift_id: Option<String>,

    /// Operator who completed the checkout.
    pub actor_id: String,

    pub actor_name: String,
}

impl Sale {
    /// Total number of units sold.
    pub fn total_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Whether the sale was attributed to a shift.
    #[inline]
    pub fn is_attributed(&self) -> bool {
        self.shift_id.is_some()
    }
}

/// One product line frozen into a sale.
/// Uses the snapshot pattern so later catalog edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    /// Name as it read when the sale was recorded.
    pub name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    pub line_total: Money,
}

// =============================================================================
// Shift
// =============================================================================

/// Whether a shift is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ShiftState {
    Open,
    Closed,
}

/// A cash-drawer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Shift {
    pub id: String,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    /// Display name of the operator who opened the drawer.
    pub cashier: String,

    /// Cash placed in the drawer before the first sale.
    pub opening_float: Money,

    /// Sales rung up while open. Only ever grows.
    pub sales_count: u64,

    /// Σ sale totals while open. Only ever grows.
    pub sales_total: Money,

    pub state: ShiftState,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,

    pub counted_cash: Option<Money>,

    /// Frozen at close.
    pub reconciliation: Option<Reconciliation>,

    /// Free-text note entered at close.
    pub note: Option<String>,
}

impl Shift {
    /// Creates a freshly opened shift.
    pub fn open(opening_float: Money, cashier: impl Into<String>) -> Self {
        Shift {
            id: new_id(),
            opened_at: Utc::now(),
            cashier: cashier.into(),
            opening_float,
            sales_count: 0,
            sales_total: Money::zero(),
            state: ShiftState::Open,
            closed_at: None,
            counted_cash: None,
            reconciliation: None,
            note: None,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == ShiftState::Open
    }

    /// Cash that should be in the drawer right now.
    #[inline]
    pub fn expected_cash(&self) -> Money {
        self.opening_float + self.sales_total
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Operator role, as reported by the authentication collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    Cashier,
}

/// The operator driving the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Actor {
            id: id.into(),
            username: username.into(),
            name: name.into(),
            role,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("Efectivo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(
            "transferencia".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Transfer
        );
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_new_shift_is_open_and_empty() {
        let shift = Shift::open(Money::from_minor(50000), "Cajero");
        assert!(shift.is_open());
        assert_eq!(shift.sales_count, 0);
        assert_eq!(shift.sales_total, Money::zero());
        assert_eq!(shift.expected_cash(), Money::from_minor(50000));
    }

    #[test]
    fn test_product_json_uses_camel_case() {
        let now = Utc::now();
        let product = Product {
            id: "p-1".to_string(),
            name: "Latte".to_string(),
            price: Money::from_minor(4000),
            category: "Bebidas Calientes".to_string(),
            stock: 25,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], 4000);
        assert!(json.get("createdAt").is_some());
    }
}
