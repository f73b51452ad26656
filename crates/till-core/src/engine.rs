//! # Engine
//!
//! Owns the catalog, cart, ledger and shift register and exposes one
//! handler per operator command.
//!
//! ## Command Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   host ──► engine.checkout(tender, actor)                               │
//! │                 │                                                       │
//! │                 ├── Err(CoreError)      nothing changed, nothing to save│
//! │                 │                                                       │
//! │                 └── Ok(Outcome { value: Sale, writes: [               │
//! │                        Put(ledger), Put(catalog), Put(shift-current) ])}│
//! │                                                                         │
//! │   host ──► store.apply(writes)   (engine state is already updated)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart edits return plain results: the cart is never persisted.

use crate::auth::{AccessPolicy, RolePolicy};
use crate::cart::{Cart, CartLine};
use crate::catalog::Catalog;
use crate::checkout::{CheckoutCoordinator, Tender};
use crate::error::CoreResult;
use crate::ledger::Ledger;
use crate::money::Money;
use crate::persist::{Document, Outcome, Snapshot, StoreKey, Write};
use crate::reconciliation::Reconciliation;
use crate::report::{LedgerAttribution, ShiftAttribution, StockAlerts};
use crate::shift::ShiftRegister;
use crate::types::{Actor, NewProduct, Product, Sale, Shift};

#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    cart: Cart,
    ledger: Ledger,
    shifts: ShiftRegister,
    policy: Box<dyn AccessPolicy>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Box::new(RolePolicy))
    }
}

impl Engine {
    pub fn new(policy: Box<dyn AccessPolicy>) -> Self {
        Engine {
            catalog: Catalog::new(),
            cart: Cart::new(),
            ledger: Ledger::new(),
            shifts: ShiftRegister::new(),
            policy,
        }
    }

    /// Rebuilds an engine from persisted documents. The cart starts empty.
    pub fn restore(snapshot: Snapshot, policy: Box<dyn AccessPolicy>) -> CoreResult<Self> {
        Ok(Engine {
            shifts: ShiftRegister::restore(snapshot.shift_current, snapshot.shift_history)?,
            catalog: Catalog::restore(snapshot.catalog)?,
            cart: Cart::new(),
            ledger: Ledger::restore(snapshot.ledger),
            policy,
        })
    }

    /// The persisted view of the engine. `session_user` is left empty; the
    /// session lives with the host.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            catalog: self.catalog.list().to_vec(),
            ledger: self.ledger.list().to_vec(),
            shift_current: self.shifts.current().cloned(),
            shift_history: self.shifts.history().to_vec(),
            session_user: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn shifts(&self) -> &ShiftRegister {
        &self.shifts
    }

    // =========================================================================
    // Catalog Commands
    // =========================================================================

    pub fn add_product(&mut self, input: NewProduct) -> CoreResult<Outcome<Product>> {
        let product = self.catalog.add(input)?;
        Ok(Outcome::new(product, vec![self.catalog_write()]))
    }

    /// Replaces a product and refreshes its cart line, if any.
    pub fn update_product(&mut self, product: Product) -> CoreResult<Outcome<Product>> {
        let product = self.catalog.update(product)?;
        self.cart.sync_product(&product);
        Ok(Outcome::new(product, vec![self.catalog_write()]))
    }

    /// Removes a product and drops its cart line, if any.
    pub fn remove_product(&mut self, id: &str) -> CoreResult<Outcome<Product>> {
        let product = self.catalog.remove(id)?;
        self.cart.forget_product(&product.id);
        Ok(Outcome::new(product, vec![self.catalog_write()]))
    }

    // =========================================================================
    // Cart Commands
    // =========================================================================

    pub fn add_to_cart(&mut self, product_id: &str, qty: i64) -> CoreResult<CartLine> {
        let product = self.catalog.get(product_id)?;
        self.cart.add_item(product, qty).cloned()
    }

    pub fn set_cart_quantity(&mut self, product_id: &str, qty: i64) -> CoreResult<()> {
        self.cart.set_quantity(&self.catalog, product_id, qty)
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> bool {
        self.cart.remove_item(product_id)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Commits the cart as a sale.
    pub fn checkout(&mut self, tender: Tender, actor: &Actor) -> CoreResult<Outcome<Sale>> {
        let sale = CheckoutCoordinator {
            catalog: &mut self.catalog,
            cart: &mut self.cart,
            ledger: &mut self.ledger,
            shifts: &mut self.shifts,
            policy: self.policy.as_ref(),
        }
        .checkout(tender, actor)?;

        let mut writes = vec![
            Write::Put(Document::Ledger(self.ledger.list().to_vec())),
            self.catalog_write(),
        ];
        if let Some(shift) = self.shifts.current() {
            writes.push(Write::Put(Document::ShiftCurrent(shift.clone())));
        }

        Ok(Outcome::new(sale, writes))
    }

    // =========================================================================
    // Shift Commands
    // =========================================================================

    /// Opens a shift in the actor's name.
    pub fn open_shift(&mut self, opening_float: Money, actor: &Actor) -> CoreResult<Outcome<Shift>> {
        let shift = self.shifts.open(opening_float, &actor.name)?.clone();
        let writes = vec![Write::Put(Document::ShiftCurrent(shift.clone()))];
        Ok(Outcome::new(shift, writes))
    }

    /// Closes the open shift and returns the closed record.
    pub fn close_shift(
        &mut self,
        counted_cash: Money,
        note: Option<String>,
    ) -> CoreResult<Outcome<Shift>> {
        let shift = self.shifts.close(counted_cash, note)?.clone();
        let writes = vec![
            Write::Delete(StoreKey::ShiftCurrent),
            Write::Put(Document::ShiftHistory(self.shifts.history().to_vec())),
        ];
        Ok(Outcome::new(shift, writes))
    }

    pub fn preview_close(&self, counted_cash: Money) -> CoreResult<Reconciliation> {
        self.shifts.preview(counted_cash)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub fn stock_alerts(&self, threshold: i64) -> StockAlerts {
        StockAlerts::from_catalog(&self.catalog, threshold)
    }

    pub fn ledger_attribution(&self) -> LedgerAttribution {
        LedgerAttribution::new(&self.ledger)
    }

    pub fn shift_attribution(&self, shift_id: &str) -> CoreResult<ShiftAttribution> {
        let shift = self.shifts.get(shift_id)?;
        Ok(ShiftAttribution::new(shift, &self.ledger))
    }

    /// Writes that persist every engine document from scratch.
    pub fn snapshot_writes(&self) -> Vec<Write> {
        let shift_current = match self.shifts.current() {
            Some(shift) => Write::Put(Document::ShiftCurrent(shift.clone())),
            None => Write::Delete(StoreKey::ShiftCurrent),
        };

        vec![
            self.catalog_write(),
            Write::Put(Document::Ledger(self.ledger.list().to_vec())),
            shift_current,
            Write::Put(Document::ShiftHistory(self.shifts.history().to_vec())),
        ]
    }

    fn catalog_write(&self) -> Write {
        Write::Put(Document::Catalog(self.catalog.list().to_vec()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, StateError, ValidationError};
    use crate::types::{PaymentMethod, Role};

    fn admin() -> Actor {
        Actor::new("u-1", "admin", "Administrador", Role::Admin)
    }

    fn cashier() -> Actor {
        Actor::new("u-2", "cajero", "Cajero", Role::Cashier)
    }

    fn product(engine: &mut Engine, name: &str, price: i64, stock: i64) -> Product {
        engine
            .add_product(NewProduct {
                name: name.to_string(),
                price: Money::from_minor(price),
                category: "Test".to_string(),
                stock,
            })
            .unwrap()
            .value
    }

    #[test]
    fn test_catalog_commands_write_catalog() {
        let mut engine = Engine::default();
        let outcome = engine
            .add_product(NewProduct {
                name: "Latte".to_string(),
                price: Money::from_minor(4000),
                category: "Bebidas Calientes".to_string(),
                stock: 25,
            })
            .unwrap();

        assert_eq!(outcome.writes.len(), 1);
        assert_eq!(outcome.writes[0].key(), StoreKey::Catalog);
    }

    #[test]
    fn test_product_edits_reach_the_cart() {
        let mut engine = Engine::default();
        let p = product(&mut engine, "Latte", 4000, 25);
        engine.add_to_cart(&p.id, 2).unwrap();

        let mut edited = p.clone();
        edited.price = Money::from_minor(4500);
        engine.update_product(edited).unwrap();
        assert_eq!(engine.cart().total(), Money::from_minor(9000));

        engine.remove_product(&p.id).unwrap();
        assert!(engine.cart().is_empty());
    }

    #[test]
    fn test_lowering_stock_trims_the_cart_line() {
        let mut engine = Engine::default();
        let p = product(&mut engine, "Muffin", 2200, 5);
        engine.add_to_cart(&p.id, 5).unwrap();

        let mut edited = p.clone();
        edited.stock = 2;
        engine.update_product(edited.clone()).unwrap();
        assert_eq!(engine.cart().quantity_of(&p.id), 2);

        edited.stock = 0;
        engine.update_product(edited).unwrap();
        assert!(engine.cart().is_empty());
    }

    #[test]
    fn test_checkout_writes() {
        let mut engine = Engine::default();
        let p = product(&mut engine, "Espresso", 2000, 40);
        engine.open_shift(Money::from_minor(50000), &cashier()).unwrap();
        engine.add_to_cart(&p.id, 1).unwrap();

        let outcome = engine
            .checkout(Tender::exact_cash(Money::from_minor(2000)), &cashier())
            .unwrap();
        let keys: Vec<_> = outcome.writes.iter().map(Write::key).collect();
        assert_eq!(
            keys,
            vec![StoreKey::Ledger, StoreKey::Catalog, StoreKey::ShiftCurrent]
        );
    }

    #[test]
    fn test_failed_checkout_changes_nothing() {
        let mut engine = Engine::default();
        let p = product(&mut engine, "Espresso", 2000, 40);
        engine.add_to_cart(&p.id, 1).unwrap();
        let before = engine.snapshot();

        let err = engine
            .checkout(
                Tender::new(PaymentMethod::Cash, Money::from_minor(2000)),
                &cashier(),
            )
            .unwrap_err();
        assert_eq!(err, StateError::ShiftRequired.into());
        assert_eq!(engine.snapshot(), before);
        assert_eq!(engine.cart().item_count(), 1);
    }

    #[test]
    fn test_shift_commands() {
        let mut engine = Engine::default();
        let opened = engine.open_shift(Money::from_minor(1000), &admin()).unwrap();
        assert_eq!(opened.value.cashier, "Administrador");
        assert_eq!(opened.writes.len(), 1);

        let preview = engine.preview_close(Money::from_minor(900)).unwrap();
        assert_eq!(preview.discrepancy, Money::from_minor(-100));

        let closed = engine.close_shift(Money::from_minor(1000), None).unwrap();
        assert_eq!(
            closed.writes,
            vec![
                Write::Delete(StoreKey::ShiftCurrent),
                Write::Put(Document::ShiftHistory(vec![closed.value.clone()])),
            ]
        );
        assert!(matches!(
            engine.close_shift(Money::zero(), None),
            Err(CoreError::State(StateError::NotOpen))
        ));
    }

    #[test]
    fn test_cart_commands() {
        let mut engine = Engine::default();
        let p = product(&mut engine, "Muffin", 2200, 2);

        engine.add_to_cart(&p.id, 2).unwrap();
        assert!(matches!(
            engine.add_to_cart(&p.id, 1),
            Err(CoreError::Validation(ValidationError::InsufficientStock { .. }))
        ));
        engine.set_cart_quantity(&p.id, 1).unwrap();
        assert_eq!(engine.cart().total_quantity(), 1);
        assert!(engine.remove_from_cart(&p.id));
        assert!(!engine.remove_from_cart(&p.id));
    }

    #[test]
    fn test_restore_round_trip() {
        let mut engine = Engine::default();
        let mut store = Snapshot::default();

        let p = product(&mut engine, "Croissant", 2800, 12);
        store.apply(&engine.snapshot_writes());
        let opened = engine.open_shift(Money::from_minor(500), &cashier()).unwrap();
        store.apply(&opened.writes);
        engine.add_to_cart(&p.id, 2).unwrap();
        let sold = engine
            .checkout(Tender::exact_cash(Money::from_minor(5600)), &cashier())
            .unwrap();
        store.apply(&sold.writes);

        let rebuilt = Engine::restore(store, Box::new(RolePolicy)).unwrap();
        assert_eq!(rebuilt.snapshot(), engine.snapshot());
    }
}
