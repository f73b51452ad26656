//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│   Sale   │       │
//! │  │  Cart    │     │          │     │ (tender) │     │ recorded │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   add_to_cart        every add and quantity change      │
//! │                   update_cart_item   is checked against stock           │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is never persisted; these commands produce no writes.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{ConfigState, EngineState};
use till_core::{Cart, CartLine, CartTotals};

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub total_display: String,
}

impl CartResponse {
    pub fn new(cart: &Cart, config: &ConfigState) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
            total_display: config.format_money(cart.total()),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(engine: &EngineState, config: &ConfigState) -> CartResponse {
    debug!("get_cart command");
    engine.with_engine(|e| CartResponse::new(e.cart(), config))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as new line
/// - The combined quantity may not exceed stock
pub fn add_to_cart(
    engine: &EngineState,
    config: &ConfigState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    engine.with_engine_mut(|e| -> Result<CartResponse, ApiError> {
        e.add_to_cart(product_id, quantity)?;
        Ok(CartResponse::new(e.cart(), config))
    })
}

/// Sets the quantity of a line. Zero or less removes it.
pub fn update_cart_item(
    engine: &EngineState,
    config: &ConfigState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_item command");

    engine.with_engine_mut(|e| -> Result<CartResponse, ApiError> {
        e.set_cart_quantity(product_id, quantity)?;
        Ok(CartResponse::new(e.cart(), config))
    })
}

/// Removes a line from the cart.
pub fn remove_from_cart(
    engine: &EngineState,
    config: &ConfigState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart command");

    engine.with_engine_mut(|e| -> Result<CartResponse, ApiError> {
        if !e.remove_from_cart(product_id) {
            return Err(ApiError::not_found("Cart line", product_id));
        }
        Ok(CartResponse::new(e.cart(), config))
    })
}

/// Clears all lines from the cart.
pub fn clear_cart(engine: &EngineState, config: &ConfigState) -> CartResponse {
    debug!("clear_cart command");
    engine.with_engine_mut(|e| {
        e.clear_cart();
        CartResponse::new(e.cart(), config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Harness;
    use crate::error::ErrorCode;
    use till_core::Money;

    #[tokio::test]
    async fn test_add_accumulates_until_stock() {
        let h = Harness::new().await;
        let muffin = h.product("Muffin", 2200, 2);

        add_to_cart(&h.engine, &h.config, &muffin.id, None).unwrap();
        let cart = add_to_cart(&h.engine, &h.config, &muffin.id, None).unwrap();
        assert_eq!(cart.lines[0].quantity, 2);

        let err = add_to_cart(&h.engine, &h.config, &muffin.id, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(get_cart(&h.engine, &h.config).totals.total_quantity, 2);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let h = Harness::new().await;
        let latte = h.product("Latte", 4000, 25);
        let espresso = h.product("Espresso", 2000, 40);

        add_to_cart(&h.engine, &h.config, &latte.id, Some(1)).unwrap();
        add_to_cart(&h.engine, &h.config, &espresso.id, Some(1)).unwrap();

        let cart = update_cart_item(&h.engine, &h.config, &latte.id, 3).unwrap();
        assert_eq!(cart.totals.total, Money::from_minor(14000));
        assert_eq!(cart.total_display, "$14000");

        let cart = update_cart_item(&h.engine, &h.config, &latte.id, 0).unwrap();
        assert_eq!(cart.lines.len(), 1);

        let cart = remove_from_cart(&h.engine, &h.config, &espresso.id).unwrap();
        assert!(cart.lines.is_empty());

        let err = remove_from_cart(&h.engine, &h.config, &espresso.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let h = Harness::new().await;
        let latte = h.product("Latte", 4000, 25);
        add_to_cart(&h.engine, &h.config, &latte.id, Some(2)).unwrap();

        let cart = clear_cart(&h.engine, &h.config);
        assert!(cart.lines.is_empty());
        assert_eq!(cart.totals.total, Money::zero());
    }
}
