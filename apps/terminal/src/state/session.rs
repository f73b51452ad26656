//! # Session State
//!
//! The operator currently signed in at this terminal. Signing in and out
//! yields the `session-user` write so the session survives a restart.

use std::sync::{Arc, Mutex};

use till_core::{Actor, Document, StoreKey, Write};

use crate::error::ApiError;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    actor: Arc<Mutex<Option<Actor>>>,
}

impl SessionState {
    /// Starts with the actor restored from the `session-user` document, if any.
    pub fn new(actor: Option<Actor>) -> Self {
        SessionState {
            actor: Arc::new(Mutex::new(actor)),
        }
    }

    pub fn current_actor(&self) -> Option<Actor> {
        self.actor.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The signed-in actor, or `NOT_SIGNED_IN`.
    pub fn require_actor(&self) -> Result<Actor, ApiError> {
        self.current_actor().ok_or_else(ApiError::not_signed_in)
    }

    /// Replaces the signed-in actor.
    pub fn sign_in(&self, actor: Actor) -> Write {
        let mut slot = self.actor.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(actor.clone());
        Write::Put(Document::SessionUser(actor))
    }

    /// Clears the session. `None` if nobody was signed in.
    pub fn sign_out(&self) -> Option<(Actor, Write)> {
        let mut slot = self.actor.lock().unwrap_or_else(|e| e.into_inner());
        slot.take()
            .map(|actor| (actor, Write::Delete(StoreKey::SessionUser)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::Role;

    #[test]
    fn test_sign_in_and_out() {
        let session = SessionState::default();
        assert!(session.require_actor().is_err());

        let cashier = Actor::new("2", "cajero", "Cajero", Role::Cashier);
        let write = session.sign_in(cashier.clone());
        assert_eq!(write.key(), StoreKey::SessionUser);
        assert_eq!(session.current_actor(), Some(cashier.clone()));

        let (actor, write) = session.sign_out().unwrap();
        assert_eq!(actor, cashier);
        assert!(matches!(write, Write::Delete(StoreKey::SessionUser)));
        assert!(session.sign_out().is_none());
    }
}
