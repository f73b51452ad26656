//! # State Module
//!
//! Application state for the terminal, one type per concern. Commands take
//! only the states they need.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Terminal (console.rs)                      │   │
//! │  │  engine · db · session · config                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │      ┌──────────────┬────────┴───────┬──────────────────┐              │
//! │      ▼              ▼                ▼                  ▼               │
//! │  ┌──────────┐  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐    │
//! │  │ Engine   │  │   DbState    │  │ SessionState │  │ ConfigState  │    │
//! │  │ State    │  │              │  │              │  │              │    │
//! │  │ Arc<     │  │  Database +  │  │  Arc<Mutex<  │  │  store name  │    │
//! │  │  Mutex<  │  │  writer      │  │   Option<    │  │  currency    │    │
//! │  │  Engine>>│  │  queue       │  │   Actor>>>   │  │  operators   │    │
//! │  └──────────┘  └──────────────┘  └──────────────┘  └──────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • EngineState: one mutex, commands run one at a time                  │
//! │  • DbState: single writer task applies batches in order                │
//! │  • SessionState: mutex around the signed-in actor                      │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod engine;
mod session;

pub use config::ConfigState;
pub use db::DbState;
pub use engine::EngineState;
pub use session::SessionState;
