//! # Validation Module
//!
//! Input validation for catalog, cart, checkout and shift commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console parsing (terminal app)                               │
//! │  └── Numbers parse, arguments present                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Field rules: names, prices, quantities, cash amounts              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Services (catalog, cart, shift register, checkout)           │
//! │  └── Cross-entity rules: stock, tender, shift state                    │
//! │                                                                         │
//! │  Every layer rejects BEFORE any state is touched.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CASH, MAX_NAME_LENGTH, MAX_PRICE, MAX_STOCK};

/// Outcome of a single field check.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Product names must carry at least one visible character.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ```rust
/// use till_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Café Americano").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name)
}

/// Validates a category label. Same rules as a product name.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_text("category", category)
}

fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidQuantity {
            field: format!("{field} length"),
            constraint: format!("at most {MAX_NAME_LENGTH} characters"),
            value: value.chars().count() as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity the operator asks for (cart add, stock decrement).
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::InvalidQuantity {
            field: "quantity".to_string(),
            constraint: "positive".to_string(),
            value: qty,
        });
    }

    Ok(())
}

/// Validates a stock count on a product.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero means sold out
/// - At most [`MAX_STOCK`]
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::InvalidQuantity {
            field: "stock".to_string(),
            constraint: format!("between 0 and {MAX_STOCK}"),
            value: stock,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed for giveaways
/// - At most [`MAX_PRICE`]
///
/// ```rust
/// use till_core::money::Money;
/// use till_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_minor(2500)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_minor(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::InvalidPrice { value: price });
    }
    check_ceiling("price", price, MAX_PRICE)
}

/// Validates a cash amount the operator counts or places in the drawer.
///
/// ## Rules
/// - Must be non-negative (an empty drawer is a valid float)
/// - At most [`MAX_CASH`]
pub fn validate_cash_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value: amount,
        });
    }
    check_ceiling(field, amount, MAX_CASH)
}

fn check_ceiling(field: &str, value: Money, limit: i64) -> ValidationResult<()> {
    if value.minor() > limit {
        return Err(ValidationError::AmountTooLarge {
            field: field.to_string(),
            limit: Money::from_minor(limit),
            value,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
