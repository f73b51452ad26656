//! # Engine State
//!
//! The engine behind one mutex. Every command runs to completion before the
//! next one takes the lock.

use std::sync::{Arc, Mutex};

use till_core::Engine;

/// Thread-safe engine wrapper.
///
/// ## Thread Safety
/// `Arc<Mutex<T>>` gives exclusive access for every command. A poisoned lock
/// is recovered: the engine validates before it mutates, so a panic in a
/// caller never leaves it half-updated.
#[derive(Debug, Clone)]
pub struct EngineState {
    engine: Arc<Mutex<Engine>>,
}

impl EngineState {
    pub fn new(engine: Engine) -> Self {
        EngineState {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Executes a read-only function on the engine.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let total = engine_state.with_engine(|e| e.cart().total());
    /// ```
    pub fn with_engine<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Engine) -> R,
    {
        let engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
        f(&engine)
    }

    /// Executes a mutating function on the engine.
    ///
    /// ## Example
    /// ```rust,ignore
    /// engine_state.with_engine_mut(|e| e.add_to_cart(&id, 1))?;
    /// ```
    pub fn with_engine_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Engine) -> R,
    {
        let mut engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut engine)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        EngineState::new(Engine::default())
    }
}
