//! # Product Commands
//!
//! Catalog listing, lookup, CRUD and stock alerts.
//!
//! ## Lookup Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator types: "latte" or "3f2a" or a full UUID                      │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  ┌────────────────────────────────────────────────────────────────┐    │
//! │  │  1. Exact id                                                   │    │
//! │  │  2. Unique id prefix                                           │    │
//! │  │  3. Unique name (case-insensitive)                             │    │
//! │  │  More than one match → BAD_INPUT, nothing → NOT_FOUND          │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, EngineState};
use till_core::{CoreResult, Money, NewProduct, Outcome, Product, StockAlerts};

/// Fields for a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category: String,
}

/// Partial product edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

/// Product as shown to the operator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub price_display: String,
    pub stock: i64,
}

impl ProductDto {
    pub fn new(product: &Product, config: &ConfigState) -> Self {
        ProductDto {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            price_display: config.format_money(product.price),
            stock: product.stock,
        }
    }
}

/// Lists the catalog in insertion order.
pub fn list_products(engine: &EngineState, config: &ConfigState) -> Vec<ProductDto> {
    debug!("list_products command");
    engine.with_engine(|e| {
        e.catalog()
            .list()
            .iter()
            .map(|p| ProductDto::new(p, config))
            .collect()
    })
}

/// Resolves what the operator typed to a single product.
pub fn find_product(engine: &EngineState, query: &str) -> Result<Product, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_input("Product id or name is required"));
    }

    engine.with_engine(|e| {
        let products = e.catalog().list();

        if let Some(product) = products.iter().find(|p| p.id == query) {
            return Ok(product.clone());
        }

        let by_prefix: Vec<&Product> = products.iter().filter(|p| p.id.starts_with(query)).collect();
        let matches = if by_prefix.is_empty() {
            products
                .iter()
                .filter(|p| p.name.eq_ignore_ascii_case(query))
                .collect()
        } else {
            by_prefix
        };

        match matches.as_slice() {
            [product] => Ok((*product).clone()),
            [] => Err(ApiError::not_found("Product", query)),
            _ => Err(ApiError::bad_input(format!(
                "'{}' matches {} products; type more of the id",
                query,
                matches.len()
            ))),
        }
    })
}

/// Adds a product to the catalog.
pub fn create_product(
    engine: &EngineState,
    db: &DbState,
    request: CreateProductRequest,
) -> Result<Product, ApiError> {
    debug!(name = %request.name, "create_product command");

    let outcome = engine.with_engine_mut(|e| {
        e.add_product(NewProduct {
            name: request.name,
            price: Money::from_minor(request.price),
            category: request.category,
            stock: request.stock,
        })
    })?;
    db.persist(outcome.writes);

    info!(product_id = %outcome.value.id, name = %outcome.value.name, "Product created");
    Ok(outcome.value)
}

/// Edits a product. Cart lines pick up the new name and price.
pub fn update_product(
    engine: &EngineState,
    db: &DbState,
    id: &str,
    request: UpdateProductRequest,
) -> Result<Product, ApiError> {
    debug!(product_id = %id, "update_product command");

    let outcome = engine.with_engine_mut(|e| -> CoreResult<Outcome<Product>> {
        let mut product = e.catalog().get(id)?.clone();
        if let Some(name) = request.name {
            product.name = name;
        }
        if let Some(price) = request.price {
            product.price = Money::from_minor(price);
        }
        if let Some(stock) = request.stock {
            product.stock = stock;
        }
        if let Some(category) = request.category {
            product.category = category;
        }
        e.update_product(product)
    })?;
    db.persist(outcome.writes);

    info!(product_id = %outcome.value.id, "Product updated");
    Ok(outcome.value)
}

/// Removes a product. Its cart line, if any, goes with it.
pub fn delete_product(engine: &EngineState, db: &DbState, id: &str) -> Result<Product, ApiError> {
    debug!(product_id = %id, "delete_product command");

    let outcome = engine.with_engine_mut(|e| e.remove_product(id))?;
    db.persist(outcome.writes);

    info!(product_id = %outcome.value.id, "Product removed");
    Ok(outcome.value)
}

/// Out-of-stock and low-stock products at the configured threshold.
pub fn get_stock_alerts(engine: &EngineState, config: &ConfigState) -> StockAlerts {
    debug!(threshold = config.low_stock_threshold, "get_stock_alerts command");
    engine.with_engine(|e| e.stock_alerts(config.low_stock_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Harness;
    use crate::error::ErrorCode;
    use till_core::StoreKey;

    #[tokio::test]
    async fn test_create_and_list() {
        let h = Harness::new().await;

        let product = create_product(
            &h.engine,
            &h.db,
            CreateProductRequest {
                name: "Croissant".to_string(),
                price: 2800,
                stock: 12,
                category: "Panadería".to_string(),
            },
        )
        .unwrap();

        let listed = list_products(&h.engine, &h.config);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, product.id);
        assert_eq!(listed[0].price_display, "$2800");

        h.db.flush().await;
        let stored: Option<Vec<Product>> =
            h.db.inner().documents().load(StoreKey::Catalog).await.unwrap();
        assert_eq!(stored, Some(vec![product]));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let h = Harness::new().await;
        let err = create_product(
            &h.engine,
            &h.db,
            CreateProductRequest {
                name: "Muffin".to_string(),
                price: -1,
                stock: 8,
                category: "Panadería".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrice);
    }

    #[tokio::test]
    async fn test_find_by_prefix_and_name() {
        let h = Harness::new().await;
        let latte = h.product("Latte", 4000, 25);
        h.product("Espresso", 2000, 40);

        assert_eq!(find_product(&h.engine, &latte.id).unwrap().id, latte.id);
        assert_eq!(find_product(&h.engine, "LATTE").unwrap().id, latte.id);
        assert_eq!(find_product(&h.engine, "mocha").unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(find_product(&h.engine, "  ").unwrap_err().code, ErrorCode::BadInput);
    }

    #[tokio::test]
    async fn test_update_refreshes_cart_line() {
        let h = Harness::new().await;
        let latte = h.product("Latte", 4000, 25);
        h.engine.with_engine_mut(|e| e.add_to_cart(&latte.id, 1)).unwrap();

        update_product(
            &h.engine,
            &h.db,
            &latte.id,
            UpdateProductRequest {
                price: Some(4200),
                ..Default::default()
            },
        )
        .unwrap();

        let total = h.engine.with_engine(|e| e.cart().total());
        assert_eq!(total, Money::from_minor(4200));
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let h = Harness::new().await;
        let err = delete_product(&h.engine, &h.db, "nope").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_stock_alerts_use_config_threshold() {
        let h = Harness::new().await;
        h.product("Muffin", 2200, 8);
        h.product("Latte", 4000, 25);
        h.product("Frappé", 4500, 0);

        let alerts = get_stock_alerts(&h.engine, &h.config);
        assert_eq!(alerts.threshold, 10);
        assert_eq!(alerts.low_stock.len(), 1);
        assert_eq!(alerts.out_of_stock.len(), 1);
    }
}
