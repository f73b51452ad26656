//! # Checkout Coordinator
//!
//! Turns the cart into a committed sale.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout                                         │
//! │                                                                         │
//! │  1. VALIDATE (nothing is touched yet)                                  │
//! │     ├── cart empty?                         → EmptyCart                 │
//! │     ├── no shift and actor lacks bypass?    → ShiftRequired             │
//! │     ├── total or shift total out of range?  → Overflow                  │
//! │     ├── tendered < total (or negative)?     → InsufficientTender        │
//! │     └── each line: product exists, stock?   → NotFound / InsufficientStock
//! │                                                                         │
//! │  2. APPLY (cannot fail after step 1)                                   │
//! │     ├── catalog.decrement_stock(line) for every line                   │
//! │     ├── shift.record_sale(1, total)        (only if a shift is open)   │
//! │     ├── ledger.append(sale)                                            │
//! │     └── cart.clear()                                                   │
//! │                                                                         │
//! │  Either every effect happens or none does.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;

use crate::auth::AccessPolicy;
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::{CoreResult, StateError, ValidationError};
use crate::ledger::Ledger;
use crate::money::Money;
use crate::shift::ShiftRegister;
use crate::types::{new_id, Actor, PaymentMethod, Sale, SaleLine};

/// Payment details entered at the tender screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tender {
    pub method: PaymentMethod,
    pub amount: Money,
}

impl Tender {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        Tender { method, amount }
    }

    /// Cash handed over for exactly `total`.
    pub fn exact_cash(total: Money) -> Self {
        Tender::new(PaymentMethod::Cash, total)
    }
}

/// Borrows the four services for the length of one checkout.
pub struct CheckoutCoordinator<'a> {
    pub catalog: &'a mut Catalog,
    pub cart: &'a mut Cart,
    pub ledger: &'a mut Ledger,
    pub shifts: &'a mut ShiftRegister,
    pub policy: &'a dyn AccessPolicy,
}

/// Everything step 1 decided. Applying it touches state for the first time.
struct CommitPlan {
    lines: Vec<SaleLine>,
    total: Money,
    change: Money,
    shift_id: Option<String>,
}

impl CheckoutCoordinator<'_> {
    /// Validates and commits the cart as a sale.
    pub fn checkout(self, tender: Tender, actor: &Actor) -> CoreResult<Sale> {
        let plan = self.plan(tender, actor)?;

        let now = Utc::now();
        let sale = Sale {
            id: new_id(),
            receipt_number: self.ledger.next_receipt_number(now.date_naive()),
            created_at: now,
            lines: plan.lines,
            total: plan.total,
            payment_method: tender.method,
            amount_tendered: tender.amount,
            change: plan.change,
            shift_id: plan.shift_id,
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
        };

        for line in &sale.lines {
            self.catalog.decrement_stock(&line.product_id, line.quantity)?;
        }
        if sale.shift_id.is_some() {
            self.shifts.record_sale(1, sale.total)?;
        }
        self.ledger.append(sale.clone());
        self.cart.clear();

        Ok(sale)
    }

    fn plan(&self, tender: Tender, actor: &Actor) -> CoreResult<CommitPlan> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let shift_id = self.shifts.current().map(|s| s.id.clone());
        if shift_id.is_none() && !self.policy.has_bypass_privilege(actor) {
            return Err(StateError::ShiftRequired.into());
        }

        let total = self.cart.checked_total().ok_or_else(|| overflow("sale total"))?;
        if shift_id.is_some() {
            self.shifts.check_sale(total)?;
        }
        if tender.amount.is_negative() || tender.amount < total {
            return Err(ValidationError::InsufficientTender {
                total,
                tendered: tender.amount,
            }
            .into());
        }

        let mut lines = Vec::with_capacity(self.cart.item_count());
        for line in self.cart.lines() {
            let product = self.catalog.get(&line.product_id)?;
            if !product.can_sell(line.quantity) {
                return Err(ValidationError::InsufficientStock {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            lines.push(SaleLine {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line
                    .checked_line_total()
                    .ok_or_else(|| overflow("line total"))?,
            });
        }

        Ok(CommitPlan {
            lines,
            total,
            change: tender
                .amount
                .checked_sub(total)
                .ok_or_else(|| overflow("change"))?,
            shift_id,
        })
    }
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RolePolicy;
    use crate::error::CoreError;
    use crate::types::{NewProduct, Product, Role};

    struct Fixture {
        catalog: Catalog,
        cart: Cart,
        ledger: Ledger,
        shifts: ShiftRegister,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                catalog: Catalog::new(),
                cart: Cart::new(),
                ledger: Ledger::new(),
                shifts: ShiftRegister::new(),
            }
        }

        fn product(&mut self, name: &str, price: i64, stock: i64) -> Product {
            self.catalog
                .add(NewProduct {
                    name: name.to_string(),
                    price: Money::from_minor(price),
                    category: "Test".to_string(),
                    stock,
                })
                .unwrap()
        }

        fn checkout(&mut self, tender: Tender, actor: &Actor) -> CoreResult<Sale> {
            CheckoutCoordinator {
                catalog: &mut self.catalog,
                cart: &mut self.cart,
                ledger: &mut self.ledger,
                shifts: &mut self.shifts,
                policy: &RolePolicy,
            }
            .checkout(tender, actor)
        }
    }

    fn cashier() -> Actor {
        Actor::new("u-2", "cajero", "Cajero", Role::Cashier)
    }

    fn admin() -> Actor {
        Actor::new("u-1", "admin", "Administrador", Role::Admin)
    }

    #[test]
    fn test_checkout_commits_everything() {
        let mut fx = Fixture::new();
        let x = fx.product("X", 2000, 10);
        let y = fx.product("Y", 1500, 10);
        fx.shifts.open(Money::from_minor(50000), "Cajero").unwrap();
        fx.cart.add_item(&x, 3).unwrap();
        fx.cart.add_item(&y, 2).unwrap();

        let sale = fx
            .checkout(
                Tender::new(PaymentMethod::Cash, Money::from_minor(10000)),
                &cashier(),
            )
            .unwrap();

        assert_eq!(sale.total, Money::from_minor(9000));
        assert_eq!(sale.change, Money::from_minor(1000));
        assert_eq!(sale.lines.len(), 2);
        assert_eq!(fx.catalog.get(&x.id).unwrap().stock, 7);
        assert_eq!(fx.catalog.get(&y.id).unwrap().stock, 8);
        assert_eq!(fx.ledger.len(), 1);
        assert!(fx.cart.is_empty());

        let shift = fx.shifts.current().unwrap();
        assert_eq!(shift.sales_count, 1);
        assert_eq!(shift.sales_total, Money::from_minor(9000));
        assert_eq!(sale.shift_id.as_deref(), Some(shift.id.as_str()));
    }

    #[test]
    fn test_empty_cart() {
        let mut fx = Fixture::new();
        fx.shifts.open(Money::zero(), "Cajero").unwrap();

        assert_eq!(
            fx.checkout(Tender::exact_cash(Money::zero()), &cashier()),
            Err(ValidationError::EmptyCart.into())
        );
    }

    #[test]
    fn test_tender_boundary() {
        let mut fx = Fixture::new();
        let p = fx.product("Latte", 4000, 5);
        fx.shifts.open(Money::zero(), "Cajero").unwrap();
        fx.cart.add_item(&p, 1).unwrap();

        let short = fx.checkout(
            Tender::new(PaymentMethod::Cash, Money::from_minor(3999)),
            &cashier(),
        );
        assert!(matches!(
            short,
            Err(CoreError::Validation(ValidationError::InsufficientTender { .. }))
        ));
        assert_eq!(fx.cart.item_count(), 1);

        let sale = fx
            .checkout(Tender::exact_cash(Money::from_minor(4000)), &cashier())
            .unwrap();
        assert_eq!(sale.change, Money::zero());
    }

    #[test]
    fn test_negative_tender_rejected() {
        let mut fx = Fixture::new();
        let p = fx.product("Agua", 0, 5);
        fx.shifts.open(Money::zero(), "Cajero").unwrap();
        fx.cart.add_item(&p, 1).unwrap();

        assert!(matches!(
            fx.checkout(
                Tender::new(PaymentMethod::Card, Money::from_minor(-1)),
                &cashier()
            ),
            Err(CoreError::Validation(ValidationError::InsufficientTender { .. }))
        ));
    }

    #[test]
    fn test_cashier_needs_shift_admin_does_not() {
        let mut fx = Fixture::new();
        let p = fx.product("Muffin", 2200, 8);
        fx.cart.add_item(&p, 1).unwrap();

        assert_eq!(
            fx.checkout(Tender::exact_cash(Money::from_minor(2200)), &cashier()),
            Err(StateError::ShiftRequired.into())
        );
        assert_eq!(fx.cart.item_count(), 1);

        let sale = fx
            .checkout(Tender::exact_cash(Money::from_minor(2200)), &admin())
            .unwrap();
        assert!(sale.shift_id.is_none());
        assert_eq!(fx.catalog.get(&p.id).unwrap().stock, 7);
    }

    #[test]
    fn test_stale_cart_fails_without_effects() {
        let mut fx = Fixture::new();
        let a = fx.product("A", 1000, 5);
        let b = fx.product("B", 1000, 5);
        fx.shifts.open(Money::zero(), "Cajero").unwrap();
        fx.cart.add_item(&a, 2).unwrap();
        fx.cart.add_item(&b, 4).unwrap();

        // Stock of B drops behind the cart's back.
        fx.catalog.decrement_stock(&b.id, 3).unwrap();
        let catalog_before = fx.catalog.clone();
        let cart_before = fx.cart.clone();

        let err = fx
            .checkout(Tender::exact_cash(Money::from_minor(6000)), &cashier())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InsufficientStock { available: 2, .. })
        ));
        assert_eq!(fx.catalog, catalog_before);
        assert_eq!(fx.cart, cart_before);
        assert!(fx.ledger.is_empty());
        assert_eq!(fx.shifts.current().unwrap().sales_count, 0);
    }

    #[test]
    fn test_sale_lines_are_frozen() {
        let mut fx = Fixture::new();
        let p = fx.product("Cappuccino", 3500, 30);
        fx.shifts.open(Money::zero(), "Cajero").unwrap();
        fx.cart.add_item(&p, 2).unwrap();

        let sale = fx
            .checkout(Tender::exact_cash(Money::from_minor(7000)), &cashier())
            .unwrap();

        let mut edited = fx.catalog.get(&p.id).unwrap().clone();
        edited.price = Money::from_minor(9999);
        fx.catalog.update(edited).unwrap();

        let stored = fx.ledger.get(&sale.id).unwrap();
        assert_eq!(stored.lines[0].unit_price, Money::from_minor(3500));
        assert_eq!(stored.total, Money::from_minor(7000));
    }

    #[test]
    fn test_sale_that_would_overflow_the_shift_leaves_no_trace() {
        let mut fx = Fixture::new();
        let p = fx.product("Lingote", crate::MAX_PRICE, crate::MAX_STOCK);
        fx.shifts.open(Money::from_minor(crate::MAX_CASH), "Cajero").unwrap();
        let room = i64::MAX - crate::MAX_CASH;
        fx.shifts.record_sale(1, Money::from_minor(room)).unwrap();
        fx.cart.add_item(&p, 1).unwrap();
        let catalog_before = fx.catalog.clone();

        let err = fx
            .checkout(Tender::exact_cash(Money::from_minor(crate::MAX_PRICE)), &cashier())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Overflow { .. })
        ));
        assert_eq!(fx.catalog, catalog_before);
        assert_eq!(fx.cart.item_count(), 1);
        assert!(fx.ledger.is_empty());
        assert_eq!(fx.shifts.current().unwrap().sales_total, Money::from_minor(room));
    }

    #[test]
    fn test_largest_accepted_sale_commits_exactly() {
        let mut fx = Fixture::new();
        let p = fx.product("Lingote", crate::MAX_PRICE, crate::MAX_STOCK);
        fx.shifts.open(Money::from_minor(crate::MAX_CASH), "Cajero").unwrap();
        fx.cart.add_item(&p, crate::MAX_STOCK).unwrap();

        let total = Money::from_minor(crate::MAX_PRICE * crate::MAX_STOCK);
        let sale = fx
            .checkout(Tender::new(PaymentMethod::Card, Money::from_minor(i64::MAX)), &cashier())
            .unwrap();

        assert_eq!(sale.total, total);
        assert_eq!(sale.lines[0].line_total, total);
        assert_eq!(sale.change, Money::from_minor(i64::MAX - total.minor()));
        assert_eq!(
            fx.shifts.expected_cash().unwrap(),
            Money::from_minor(crate::MAX_CASH + total.minor())
        );
    }
}
