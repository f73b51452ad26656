//! # Sale Commands
//!
//! Checkout, receipts and the sales ledger.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  > checkout 10000 cash                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  session.require_actor()          NOT_SIGNED_IN if nobody is in         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  engine.checkout(tender, actor)   validates everything, then commits    │
//! │         │                         sale + stock + shift counters         │
//! │         ▼                                                               │
//! │  db.persist([ledger, catalog, shift-current])                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ReceiptResponse                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, EngineState, SessionState};
use till_core::{LedgerAttribution, Money, PaymentMethod, Sale, Tender};

/// Tender offered at checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRequest {
    pub method: PaymentMethod,
    /// `None` tenders exactly the cart total.
    pub amount: Option<i64>,
}

impl Default for CheckoutRequest {
    fn default() -> Self {
        CheckoutRequest {
            method: PaymentMethod::Cash,
            amount: None,
        }
    }
}

/// Plain data for a receipt. Layout and printing happen elsewhere.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale_id: String,
    pub receipt_number: String,
    pub store_name: String,
    pub timestamp: String,
    pub cashier: String,
    pub items: Vec<ReceiptItem>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub amount_tendered: Money,
    pub change: Money,
    pub total_display: String,
    pub change_display: String,
    /// False for sales rung up with no shift open.
    pub shift_attributed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl ReceiptResponse {
    pub fn new(sale: &Sale, config: &ConfigState) -> Self {
        ReceiptResponse {
            sale_id: sale.id.clone(),
            receipt_number: sale.receipt_number.clone(),
            store_name: config.store_name.clone(),
            timestamp: sale.created_at.to_rfc3339(),
            cashier: sale.actor_name.clone(),
            items: sale
                .lines
                .iter()
                .map(|l| ReceiptItem {
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total,
                })
                .collect(),
            total: sale.total,
            payment_method: sale.payment_method,
            amount_tendered: sale.amount_tendered,
            change: sale.change,
            total_display: config.format_money(sale.total),
            change_display: config.format_money(sale.change),
            shift_attributed: sale.is_attributed(),
        }
    }
}

/// Commits the cart as a sale.
pub fn checkout(
    engine: &EngineState,
    db: &DbState,
    session: &SessionState,
    config: &ConfigState,
    request: CheckoutRequest,
) -> Result<ReceiptResponse, ApiError> {
    let actor = session.require_actor()?;
    debug!(actor = %actor.username, method = %request.method, amount = ?request.amount, "checkout command");

    let outcome = engine.with_engine_mut(|e| {
        let amount = request
            .amount
            .map(Money::from_minor)
            .unwrap_or_else(|| e.cart().total());
        e.checkout(Tender::new(request.method, amount), &actor)
    })?;
    db.persist(outcome.writes);

    let sale = outcome.value;
    if sale.is_attributed() {
        info!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total = %sale.total,
            items = sale.lines.len(),
            "Sale completed"
        );
    } else {
        warn!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            actor = %actor.username,
            "Sale completed with no open shift"
        );
    }

    Ok(ReceiptResponse::new(&sale, config))
}

/// Every committed sale, oldest first.
pub fn list_sales(engine: &EngineState, config: &ConfigState) -> Vec<ReceiptResponse> {
    debug!("list_sales command");
    engine.with_engine(|e| {
        e.ledger()
            .list()
            .iter()
            .map(|s| ReceiptResponse::new(s, config))
            .collect()
    })
}

/// Re-issues the receipt for one sale.
pub fn get_receipt(
    engine: &EngineState,
    config: &ConfigState,
    sale_id: &str,
) -> Result<ReceiptResponse, ApiError> {
    debug!(sale_id = %sale_id, "get_receipt command");
    engine.with_engine(|e| -> Result<ReceiptResponse, ApiError> {
        let sale = e.ledger().get(sale_id)?;
        Ok(ReceiptResponse::new(sale, config))
    })
}

/// Ledger totals split by shift attribution.
pub fn ledger_report(engine: &EngineState) -> LedgerAttribution {
    debug!("ledger_report command");
    engine.with_engine(|e| e.ledger_attribution())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::Harness;
    use crate::error::ErrorCode;
    use till_core::{Product, StoreKey};

    #[tokio::test]
    async fn test_checkout_requires_sign_in() {
        let h = Harness::new().await;
        let err = checkout(&h.engine, &h.db, &h.session, &h.config, CheckoutRequest::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotSignedIn);
    }

    #[tokio::test]
    async fn test_receipt_with_change() {
        let h = Harness::new().await;
        h.sign_in("admin");
        let x = h.product("Cappuccino", 2000, 10);
        let y = h.product("Espresso", 1500, 10);
        h.engine.with_engine_mut(|e| e.add_to_cart(&x.id, 3)).unwrap();
        h.engine.with_engine_mut(|e| e.add_to_cart(&y.id, 2)).unwrap();

        let receipt = checkout(
            &h.engine,
            &h.db,
            &h.session,
            &h.config,
            CheckoutRequest {
                method: PaymentMethod::Cash,
                amount: Some(10000),
            },
        )
        .unwrap();

        assert_eq!(receipt.total, Money::from_minor(9000));
        assert_eq!(receipt.change, Money::from_minor(1000));
        assert_eq!(receipt.change_display, "$1000");
        assert_eq!(receipt.store_name, "Café POS");
        assert_eq!(receipt.cashier, "Administrador");
        assert_eq!(receipt.items.len(), 2);
        assert!(!receipt.shift_attributed);
        assert!(ledger_report(&h.engine).diverges());
    }

    #[tokio::test]
    async fn test_cashier_without_shift_keeps_cart() {
        let h = Harness::new().await;
        h.sign_in("cajero");
        let latte = h.product("Latte", 4000, 25);
        h.engine.with_engine_mut(|e| e.add_to_cart(&latte.id, 1)).unwrap();

        let err = checkout(&h.engine, &h.db, &h.session, &h.config, CheckoutRequest::default())
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ShiftRequired);
        assert_eq!(h.engine.with_engine(|e| e.cart().item_count()), 1);
        assert!(list_sales(&h.engine, &h.config).is_empty());
    }

    #[tokio::test]
    async fn test_short_tender_rejected() {
        let h = Harness::new().await;
        h.sign_in("admin");
        let latte = h.product("Latte", 4000, 25);
        h.engine.with_engine_mut(|e| e.add_to_cart(&latte.id, 1)).unwrap();

        let err = checkout(
            &h.engine,
            &h.db,
            &h.session,
            &h.config,
            CheckoutRequest {
                method: PaymentMethod::Cash,
                amount: Some(3999),
            },
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientTender);
    }

    #[tokio::test]
    async fn test_checkout_persists_ledger_and_stock() {
        let h = Harness::new().await;
        h.sign_in("admin");
        let latte = h.product("Latte", 4000, 25);
        h.engine.with_engine_mut(|e| e.add_to_cart(&latte.id, 2)).unwrap();

        let receipt =
            checkout(&h.engine, &h.db, &h.session, &h.config, CheckoutRequest::default()).unwrap();
        assert_eq!(receipt.change, Money::zero());

        h.db.flush().await;
        let store = h.db.inner().documents();
        let ledger: Vec<Sale> = store.load(StoreKey::Ledger).await.unwrap().unwrap();
        let catalog: Vec<Product> = store.load(StoreKey::Catalog).await.unwrap().unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].receipt_number, receipt.receipt_number);
        assert_eq!(catalog[0].stock, 23);

        let again = get_receipt(&h.engine, &h.config, &receipt.sale_id).unwrap();
        assert_eq!(again.receipt_number, receipt.receipt_number);
    }
}
