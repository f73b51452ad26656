//! # Commands Module
//!
//! Everything the console can ask of the engine.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── product.rs  ◄─── Catalog listing, CRUD, stock alerts
//! ├── cart.rs     ◄─── Cart manipulation
//! ├── sale.rs     ◄─── Checkout, receipts, ledger
//! ├── shift.rs    ◄─── Open / close / reconcile the drawer
//! └── session.rs  ◄─── Sign in and out
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  fn open_shift(engine, db, session, float) -> Result<Shift, ApiError>  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  engine.with_engine_mut(|e| e.open_shift(..))  ◄── Outcome{value,writes}│
//! │         │                                                               │
//! │         ▼                                                               │
//! │  db.persist(outcome.writes)  ◄── queued, never awaited                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Ok(outcome.value)  ──► console prints JSON                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command declares only the state it needs.

pub mod cart;
pub mod product;
pub mod sale;
pub mod session;
pub mod shift;

#[cfg(test)]
pub(crate) mod test_support {
    use till_core::{Money, NewProduct, Product};
    use till_db::{Database, DbConfig};

    use crate::state::{ConfigState, DbState, EngineState, SessionState};

    /// Fresh in-memory terminal state.
    pub struct Harness {
        pub engine: EngineState,
        pub db: DbState,
        pub session: SessionState,
        pub config: ConfigState,
    }

    impl Harness {
        pub async fn new() -> Self {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            Harness {
                engine: EngineState::default(),
                db: DbState::spawn(db),
                session: SessionState::default(),
                config: ConfigState::default(),
            }
        }

        pub fn sign_in(&self, username: &str) {
            let actor = self.config.operator(username).unwrap().clone();
            self.db.persist(vec![self.session.sign_in(actor)]);
        }

        pub fn product(&self, name: &str, price: i64, stock: i64) -> Product {
            let outcome = self
                .engine
                .with_engine_mut(|e| {
                    e.add_product(NewProduct {
                        name: name.to_string(),
                        price: Money::from_minor(price),
                        category: "Bebidas Calientes".to_string(),
                        stock,
                    })
                })
                .unwrap();
            self.db.persist(outcome.writes);
            outcome.value
        }
    }
}
