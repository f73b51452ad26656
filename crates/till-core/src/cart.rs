//! # Cart
//!
//! The operator's in-progress order. Never persisted.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Engine Call             Cart Change           │
//! │  ───────────────          ───────────             ───────────           │
//! │                                                                         │
//! │  Pick product ───────────► add_item() ──────────► line.qty += n        │
//! │                                                   (or new line)        │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► line.qty = n         │
//! │                                                   (n <= 0 removes)     │
//! │                                                                         │
//! │  Remove line ────────────► remove_item() ───────► line removed         │
//! │                                                                         │
//! │  Sale committed ─────────► clear() ─────────────► no lines             │
//! │                                                                         │
//! │  NOTE: every stock check runs BEFORE the cart is touched, so a         │
//! │        rejected edit leaves the cart exactly as it was.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;

/// A line in the cart.
///
/// ## Design Notes
/// `name` and `unit_price` are a display snapshot of the product. They are
/// refreshed whenever the line is touched or the product is edited, so the
/// cart always shows what the catalog currently charges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    fn refresh(&mut self, product: &Product) {
        self.name.clone_from(&product.name);
        self.unit_price = product.price;
    }

    /// unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// unit price × quantity, `None` when it leaves the `Money` range.
    pub fn checked_line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every line has `quantity >= 1`
/// - No line exceeds the product's current stock
/// - The total fits in `Money`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a product already in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    /// Adds `qty` units of a product, merging with an existing line.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if `qty <= 0`
    /// - `InsufficientStock` if the line would exceed `product.stock`
    /// - `Overflow` if the cart total would leave the `Money` range
    pub fn add_item(&mut self, product: &Product, qty: i64) -> CoreResult<&CartLine> {
        validate_quantity(qty)?;

        // A sum past i64::MAX can never be in stock.
        let requested = self
            .quantity_of(&product.id)
            .checked_add(qty)
            .unwrap_or(i64::MAX);
        check_stock(product, requested)?;
        self.check_total_with(product, requested)?;

        let index = match self.lines.iter().position(|l| l.product_id == product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = requested;
                line.refresh(product);
                index
            }
            None => {
                self.lines.push(CartLine::from_product(product, qty));
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[index])
    }

    /// Sets a line's quantity.
    ///
    /// ## Behavior
    /// - `qty <= 0` removes the line (a no-op if it was not in the cart)
    /// - otherwise the product must exist and have `stock >= qty`
    pub fn set_quantity(&mut self, catalog: &Catalog, product_id: &str, qty: i64) -> CoreResult<()> {
        if qty <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        let product = catalog.get(product_id)?;
        check_stock(product, qty)?;
        self.check_total_with(product, qty)?;

        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = qty;
                line.refresh(product);
            }
            None => self.lines.push(CartLine::from_product(product, qty)),
        }

        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Refreshes the snapshot of a product that was edited in the catalog.
    ///
    /// A line holding more units than the new stock is cut down to it, and
    /// dropped when the product is sold out.
    pub fn sync_product(&mut self, product: &Product) {
        let Some(line) = self.line_mut(&product.id) else {
            return;
        };
        line.refresh(product);
        line.quantity = line.quantity.min(product.stock);
        if line.quantity <= 0 {
            self.remove_item(&product.id);
        }
    }

    /// Drops the line of a product that left the catalog.
    pub fn forget_product(&mut self, product_id: &str) {
        self.remove_item(product_id);
    }

    /// Σ(unit_price × quantity), saturating.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ(unit_price × quantity), `None` when it leaves the `Money` range.
    pub fn checked_total(&self) -> Option<Money> {
        self.lines
            .iter()
            .map(CartLine::checked_line_total)
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line?))
    }

    /// Rejects an edit that would set `product`'s line to `qty` units when
    /// the resulting total does not fit.
    fn check_total_with(&self, product: &Product, qty: i64) -> Result<(), ValidationError> {
        let others = self
            .lines
            .iter()
            .filter(|l| l.product_id != product.id)
            .map(CartLine::checked_line_total);

        std::iter::once(product.price.checked_mul(qty))
            .chain(others)
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line?))
            .map(|_| ())
            .ok_or_else(|| ValidationError::Overflow {
                field: "cart total".to_string(),
            })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |acc, l| acc.saturating_add(l.quantity))
    }
}

fn check_stock(product: &Product, requested: i64) -> Result<(), ValidationError> {
    if product.can_sell(requested) {
        Ok(())
    } else {
        Err(ValidationError::InsufficientStock {
            product_id: product.id.clone(),
            name: product.name.clone(),
            available: product.stock,
            requested,
        })
    }
}

/// Cart totals summary for console responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
