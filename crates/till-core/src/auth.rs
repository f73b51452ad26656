//! # Access Policy
//!
//! Authentication happens outside the engine; it only sees the signed-in
//! [`Actor`] and asks a policy what that actor may skip.

use std::fmt;

use crate::types::{Actor, Role};

/// Decides which actors may ring up sales with no shift open.
pub trait AccessPolicy: fmt::Debug + Send + Sync {
    fn has_bypass_privilege(&self, actor: &Actor) -> bool;
}

/// Grants the bypass to administrators only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn has_bypass_privilege(&self, actor: &Actor) -> bool {
        actor.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admins_bypass() {
        let admin = Actor::new("1", "admin", "Administrador", Role::Admin);
        let cashier = Actor::new("2", "cajero", "Cajero", Role::Cashier);

        assert!(RolePolicy.has_bypass_privilege(&admin));
        assert!(!RolePolicy.has_bypass_privilege(&cashier));
    }
}
