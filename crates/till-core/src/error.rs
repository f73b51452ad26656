//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── ValidationError  - bad operator input (stock, tender, price...)   │
//! │  ├── StateError       - shift state machine violations                 │
//! │  └── CoreError        - either of the above, or NotFound               │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - persistence failures (never fatal)             │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - what the operator sees (code + message)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Every error is raised BEFORE any state is mutated
//! 2. Include context in error messages (product, amounts, ids)
//! 3. Errors are enum variants, never String
//! 4. All of them are recoverable: the operator fixes input and retries

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Top-level engine error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Operator input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The shift state machine refused the transition.
    #[error(transparent)]
    State(#[from] StateError),

    /// An identity that does not exist was referenced.
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// A persisted document could not be turned back into engine state.
    ///
    /// ## When This Occurs
    /// - `shift-current` holds a shift that is not open
    /// - `shift-history` holds a shift that is still open
    #[error("Corrupt {key} document: {reason}")]
    CorruptDocument { key: String, reason: String },
}

impl CoreError {
    /// Creates a NotFound error for a given entity and ID.
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// The kinds of identity the engine can fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Product,
    Sale,
    Shift,
    Operator,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Product => "Product",
            Entity::Sale => "Sale",
            Entity::Shift => "Shift",
            Entity::Operator => "Operator",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Requested quantity exceeds what the catalog holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (in cart: 2, adding: 1)
    ///      │
    ///      ▼
    /// Check stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Muffin", available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// Operator sees: "Insufficient stock for Muffin: available 2, requested 3"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// The customer handed over less than the cart total.
    #[error("Insufficient tender: total {total}, tendered {tendered}")]
    InsufficientTender { total: Money, tendered: Money },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A quantity or stock count outside its allowed range.
    #[error("{field} must be {constraint}, got {value}")]
    InvalidQuantity {
        field: String,
        constraint: String,
        value: i64,
    },

    /// A product price below zero.
    #[error("Price cannot be negative, got {value}")]
    InvalidPrice { value: Money },

    /// A cash amount (float, counted cash) below zero.
    #[error("{field} cannot be negative, got {value}")]
    NegativeAmount { field: String, value: Money },

    /// A required text field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// A price or cash amount above the till's ceiling.
    #[error("{field} cannot exceed {limit}, got {value}")]
    AmountTooLarge {
        field: String,
        limit: Money,
        value: Money,
    },

    /// A running total would leave the range `Money` can hold.
    #[error("{field} is too large to record")]
    Overflow { field: String },
}

// =============================================================================
// State Error
// =============================================================================

/// Shift state machine violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A cashier tried to check out with no open shift.
    #[error("No shift is open; ask an administrator to open one")]
    ShiftRequired,

    /// `open` while a shift is already running.
    #[error("Shift {shift_id} is already open")]
    AlreadyOpen { shift_id: String },

    /// `close` or `record_sale` with no shift running.
    #[error("No shift is open")]
    NotOpen,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
