//! # till-core: Transaction & Shift Engine for Till POS
//!
//! The selling and cash-drawer rules of Till POS, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator Console (apps/terminal)                │   │
//! │  │    products ──► add ──► checkout ──► open / close shift         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ command handlers                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │   cart    │  │  ledger   │  │   shift   │  │   │
//! │  │   │  Product  │  │ CartLine  │  │   Sale    │  │  Register │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │        ▲               ▲              ▲              ▲         │   │
//! │  │        └───────────────┴── checkout ──┴──────────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE STATE               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Outcome { value, writes }              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Document Store)                     │   │
//! │  │        catalog / ledger / shift-current / shift-history         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Shift, Actor)
//! - [`money`] - Integer money
//! - [`catalog`], [`cart`], [`ledger`], [`shift`] - the four services
//! - [`checkout`] - validate-then-commit sale coordinator
//! - [`reconciliation`] - expected / discrepancy / classification
//! - [`engine`] - command handlers returning persistence writes
//! - [`report`] - stock alerts and attribution summaries
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{Actor, Engine, Money, NewProduct, Role, Tender};
//!
//! let mut engine = Engine::default();
//! let cashier = Actor::new("u-2", "cajero", "Cajero", Role::Cashier);
//!
//! let coffee = engine
//!     .add_product(NewProduct {
//!         name: "Café Americano".to_string(),
//!         price: Money::from_minor(2500),
//!         category: "Bebidas Calientes".to_string(),
//!         stock: 50,
//!     })
//!     .unwrap()
//!     .value;
//!
//! engine.open_shift(Money::from_minor(50000), &cashier).unwrap();
//! engine.add_to_cart(&coffee.id, 1).unwrap();
//! engine
//!     .checkout(Tender::exact_cash(Money::from_minor(2500)), &cashier)
//!     .unwrap();
//!
//! assert_eq!(engine.shifts().expected_cash().unwrap().minor(), 52500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod persist;
pub mod reconciliation;
pub mod report;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use auth::{AccessPolicy, RolePolicy};
pub use cart::{Cart, CartLine, CartTotals};
pub use catalog::Catalog;
pub use checkout::Tender;
pub use engine::Engine;
pub use error::{CoreError, CoreResult, Entity, StateError, ValidationError};
pub use ledger::Ledger;
pub use money::Money;
pub use persist::{Document, Outcome, Snapshot, StoreKey, Write};
pub use reconciliation::{reconcile, Classification, Reconciliation};
pub use report::{LedgerAttribution, ShiftAttribution, StockAlerts};
pub use shift::ShiftRegister;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which a product shows up in stock alerts.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Longest product name or category label accepted.
pub const MAX_NAME_LENGTH: usize = 200;

/// Highest unit price accepted, in minor units.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Highest stock count a product may carry.
pub const MAX_STOCK: i64 = 1_000_000;

/// Highest opening float or counted cash accepted, in minor units.
pub const MAX_CASH: i64 = 1_000_000_000_000_000;
