//! # Reports
//!
//! Read-only summaries over the catalog, ledger and shift register.
//!
//! ## Attribution
//! ```text
//! Ledger ──┬── sales tagged with a shift ──► Σ should equal that shift's sales_total
//!          │
//!          └── sales with no shift ────────► made by an actor with the bypass
//!                                            privilege; never counted in any
//!                                            drawer, so reported separately
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::ledger::Ledger;
use crate::money::Money;
use crate::types::{Product, Sale, Shift};

/// Products that need restocking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAlerts {
    pub threshold: i64,
    pub out_of_stock: Vec<Product>,
    pub low_stock: Vec<Product>,
}

impl StockAlerts {
    pub fn from_catalog(catalog: &Catalog, threshold: i64) -> Self {
        StockAlerts {
            threshold,
            out_of_stock: catalog.out_of_stock().into_iter().cloned().collect(),
            low_stock: catalog.low_stock(threshold).into_iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.out_of_stock.is_empty() && self.low_stock.is_empty()
    }
}

/// A shift's running totals next to what the ledger recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftAttribution {
    pub shift_id: String,
    pub shift_sales_count: u64,
    pub shift_sales_total: Money,
    pub ledger_sales_count: u64,
    pub ledger_sales_total: Money,
}

impl ShiftAttribution {
    pub fn new(shift: &Shift, ledger: &Ledger) -> Self {
        let sales = ledger.for_shift(&shift.id);
        ShiftAttribution {
            shift_id: shift.id.clone(),
            shift_sales_count: shift.sales_count,
            shift_sales_total: shift.sales_total,
            ledger_sales_count: sales.len() as u64,
            ledger_sales_total: sales.iter().map(|s| s.total).sum(),
        }
    }

    /// Whether the shift's counters disagree with its ledger entries.
    pub fn diverges(&self) -> bool {
        self.shift_sales_count != self.ledger_sales_count
            || self.shift_sales_total != self.ledger_sales_total
    }
}

/// The whole ledger split by attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LedgerAttribution {
    pub ledger_total: Money,
    pub attributed_total: Money,
    pub unattributed_total: Money,
    pub unattributed: Vec<Sale>,
}

impl LedgerAttribution {
    pub fn new(ledger: &Ledger) -> Self {
        let unattributed: Vec<Sale> = ledger.unattributed().into_iter().cloned().collect();
        let unattributed_total: Money = unattributed.iter().map(|s| s.total).sum();
        let ledger_total = ledger.total();

        LedgerAttribution {
            ledger_total,
            attributed_total: ledger_total - unattributed_total,
            unattributed_total,
            unattributed,
        }
    }

    /// True when the ledger holds sales no drawer will ever account for.
    pub fn diverges(&self) -> bool {
        !self.unattributed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewProduct, PaymentMethod};
    use chrono::Utc;

    fn sale(total: i64, shift_id: Option<&str>) -> Sale {
        Sale {
            id: crate::types::new_id(),
            receipt_number: "20240301-0001".to_string(),
            created_at: Utc::now(),
            lines: Vec::new(),
            total: Money::from_minor(total),
            payment_method: PaymentMethod::Cash,
            amount_tendered: Money::from_minor(total),
            change: Money::zero(),
            shift_id: shift_id.map(str::to_string),
            actor_id: "u-1".to_string(),
            actor_name: "Administrador".to_string(),
        }
    }

    #[test]
    fn test_stock_alerts() {
        let mut catalog = Catalog::new();
        for (name, stock) in [("Latte", 25), ("Muffin", 8), ("Frappé", 0)] {
            catalog
                .add(NewProduct {
                    name: name.to_string(),
                    price: Money::from_minor(1000),
                    category: "Test".to_string(),
                    stock,
                })
                .unwrap();
        }

        let alerts = StockAlerts::from_catalog(&catalog, 10);
        assert_eq!(alerts.low_stock.len(), 1);
        assert_eq!(alerts.out_of_stock[0].name, "Frappé");
        assert!(!alerts.is_empty());
    }

    #[test]
    fn test_ledger_attribution_flags_bypass_sales() {
        let mut ledger = Ledger::new();
        ledger.append(sale(9000, Some("s-1")));
        assert!(!LedgerAttribution::new(&ledger).diverges());

        ledger.append(sale(2500, None));
        let report = LedgerAttribution::new(&ledger);
        assert!(report.diverges());
        assert_eq!(report.ledger_total, Money::from_minor(11500));
        assert_eq!(report.attributed_total, Money::from_minor(9000));
        assert_eq!(report.unattributed_total, Money::from_minor(2500));
    }

    #[test]
    fn test_shift_attribution() {
        let mut shift = Shift::open(Money::zero(), "Cajero");
        shift.sales_count = 1;
        shift.sales_total = Money::from_minor(9000);

        let mut ledger = Ledger::new();
        ledger.append(sale(9000, Some(&shift.id)));
        assert!(!ShiftAttribution::new(&shift, &ledger).diverges());

        ledger.append(sale(100, Some(&shift.id)));
        assert!(ShiftAttribution::new(&shift, &ledger).diverges());
    }
}
