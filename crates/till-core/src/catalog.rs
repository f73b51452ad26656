//! # Catalog
//!
//! The product registry and its stock counts.
//!
//! ## Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Stock                                   │
//! │                                                                         │
//! │  add / update ─────────► stock set by the operator (>= 0)              │
//! │                                                                         │
//! │  checkout commit ──────► decrement_stock(id, qty)                      │
//! │                          ├── qty <= 0        → InvalidQuantity         │
//! │                          ├── unknown id      → NotFound                │
//! │                          ├── qty > stock     → InsufficientStock       │
//! │                          └── otherwise       → stock -= qty            │
//! │                                                                         │
//! │  Stock never goes below zero.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;

use crate::error::{CoreError, CoreResult, Entity, ValidationError};
use crate::money::Money;
use crate::types::{new_id, NewProduct, Product};
use crate::validation::{
    validate_category, validate_price, validate_product_name, validate_quantity, validate_stock,
    ValidationResult,
};

/// The product registry, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Rebuilds a catalog from its persisted list.
    ///
    /// ## Errors
    /// `CorruptDocument` if a product breaks the rules `add` enforces
    /// (blank name, negative or oversized price or stock).
    pub fn restore(products: Vec<Product>) -> CoreResult<Self> {
        for product in &products {
            validate_fields(&product.name, &product.category, product.price, product.stock)
                .map_err(|e| CoreError::CorruptDocument {
                    key: "catalog".to_string(),
                    reason: format!("product {}: {e}", product.id),
                })?;
        }
        Ok(Catalog { products })
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks a product up by identity.
    pub fn get(&self, id: &str) -> CoreResult<&Product> {
        self.find(id)
            .ok_or_else(|| CoreError::not_found(Entity::Product, id))
    }

    /// Looks a product up by identity without raising.
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Adds a product with a fresh identity.
    pub fn add(&mut self, input: NewProduct) -> CoreResult<Product> {
        validate_fields(&input.name, &input.category, input.price, input.stock)?;

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name: input.name.trim().to_string(),
            price: input.price,
            category: input.category.trim().to_string(),
            stock: input.stock,
            created_at: now,
            updated_at: now,
        };

        self.products.push(product.clone());
        Ok(product)
    }

    /// Replaces a product by identity.
    ///
    /// `created_at` is kept from the stored record and `updated_at` is stamped.
    pub fn update(&mut self, product: Product) -> CoreResult<Product> {
        validate_fields(&product.name, &product.category, product.price, product.stock)?;

        let slot = self
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| CoreError::not_found(Entity::Product, &product.id))?;

        *slot = Product {
            name: product.name.trim().to_string(),
            category: product.category.trim().to_string(),
            created_at: slot.created_at,
            updated_at: Utc::now(),
            ..product
        };

        Ok(slot.clone())
    }

    /// Deletes a product by identity, returning it.
    pub fn remove(&mut self, id: &str) -> CoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found(Entity::Product, id))?;

        Ok(self.products.remove(index))
    }

    /// Takes `qty` units out of stock and returns the new count.
    pub fn decrement_stock(&mut self, id: &str, qty: i64) -> CoreResult<i64> {
        validate_quantity(qty)?;

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found(Entity::Product, id))?;

        if !product.can_sell(qty) {
            return Err(ValidationError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock,
                requested: qty,
            }
            .into());
        }

        product.stock -= qty;
        product.updated_at = Utc::now();
        Ok(product.stock)
    }

    /// Products in stock but at or below `threshold` units.
    pub fn low_stock(&self, threshold: i64) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.stock > 0 && p.stock <= threshold)
            .collect()
    }

    /// Products with no stock left.
    pub fn out_of_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_out_of_stock()).collect()
    }
}

fn validate_fields(
    name: &str,
    category: &str,
    price: Money,
    stock: i64,
) -> ValidationResult<()> {
    validate_product_name(name)?;
    validate_category(category)?;
    validate_price(price)?;
    validate_stock(stock)
}

// =============================================================================
// Unit Tests
// =============================================================================
