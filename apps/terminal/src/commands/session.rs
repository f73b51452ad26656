//! # Session Commands
//!
//! Signing operators in and out. There is no password check; the operator
//! list comes from configuration.

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, SessionState};
use till_core::Actor;

/// Signs in a configured operator, replacing whoever was signed in.
pub fn login(
    session: &SessionState,
    db: &DbState,
    config: &ConfigState,
    username: &str,
) -> Result<Actor, ApiError> {
    debug!(username = %username, "login command");

    let actor = config
        .operator(username)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Operator", username))?;
    db.persist(vec![session.sign_in(actor.clone())]);

    info!(username = %actor.username, role = ?actor.role, "Operator signed in");
    Ok(actor)
}

/// Signs the current operator out. Returns who that was, if anyone.
pub fn logout(session: &SessionState, db: &DbState) -> Option<Actor> {
    debug!("logout command");

    let (actor, write) = session.sign_out()?;
    db.persist(vec![write]);

    info!(username = %actor.username, "Operator signed out");
    Some(actor)
}

/// The signed-in operator.
pub fn whoami(session: &SessionState) -> Option<Actor> {
    session.current_actor()
}
