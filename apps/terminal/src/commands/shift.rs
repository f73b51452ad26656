//! # Shift Commands
//!
//! Opening, closing and reconciling the cash drawer.
//!
//! ## Drawer Session
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open 50000 ──► Shift { float 50000, sales 0 }                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout × N ──► sales_count / sales_total grow                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shift ──► expected = float + sales_total                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  close 58500 "note" ──► reconciliation frozen, shift moves to history   │
//! │                         discrepancy = counted - expected                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, EngineState, SessionState};
use till_core::{Classification, Money, Reconciliation, Shift, ShiftAttribution};

/// The drawer as it stands now.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStatusResponse {
    pub open: bool,
    pub shift: Option<Shift>,
    pub expected_cash: Option<Money>,
    pub expected_display: Option<String>,
}

/// A closed shift with its ledger cross-check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseShiftResponse {
    pub shift: Shift,
    pub attribution: ShiftAttribution,
    pub expected_display: String,
    pub counted_display: String,
    pub discrepancy_display: String,
}

/// Opens a shift in the signed-in operator's name.
pub fn open_shift(
    engine: &EngineState,
    db: &DbState,
    session: &SessionState,
    opening_float: i64,
) -> Result<Shift, ApiError> {
    let actor = session.require_actor()?;
    debug!(actor = %actor.username, opening_float, "open_shift command");

    let outcome =
        engine.with_engine_mut(|e| e.open_shift(Money::from_minor(opening_float), &actor))?;
    db.persist(outcome.writes);

    info!(
        shift_id = %outcome.value.id,
        cashier = %outcome.value.cashier,
        opening_float = %outcome.value.opening_float,
        "Shift opened"
    );
    Ok(outcome.value)
}

/// Closes the open shift against the counted cash.
pub fn close_shift(
    engine: &EngineState,
    db: &DbState,
    session: &SessionState,
    config: &ConfigState,
    counted_cash: i64,
    note: Option<String>,
) -> Result<CloseShiftResponse, ApiError> {
    let actor = session.require_actor()?;
    debug!(actor = %actor.username, counted_cash, "close_shift command");

    let (outcome, attribution) = engine.with_engine_mut(|e| -> Result<_, ApiError> {
        let outcome = e.close_shift(Money::from_minor(counted_cash), note)?;
        let attribution = e.shift_attribution(&outcome.value.id)?;
        Ok((outcome, attribution))
    })?;
    db.persist(outcome.writes);

    let shift = outcome.value;
    let reconciliation = shift
        .reconciliation
        .ok_or_else(|| ApiError::internal("Closed shift has no reconciliation"))?;

    match reconciliation.classification {
        Classification::Exact => info!(shift_id = %shift.id, "Shift closed, drawer exact"),
        Classification::Over | Classification::Short => warn!(
            shift_id = %shift.id,
            discrepancy = %reconciliation.discrepancy,
            classification = ?reconciliation.classification,
            "Shift closed with a discrepancy"
        ),
    }
    if attribution.diverges() {
        warn!(shift_id = %shift.id, "Shift counters disagree with the ledger");
    }

    Ok(CloseShiftResponse {
        expected_display: config.format_money(reconciliation.expected),
        counted_display: config.format_money(Money::from_minor(counted_cash)),
        discrepancy_display: config.format_money(reconciliation.discrepancy),
        shift,
        attribution,
    })
}

/// Current shift and the cash the drawer should hold.
pub fn current_shift(engine: &EngineState, config: &ConfigState) -> ShiftStatusResponse {
    debug!("current_shift command");
    engine.with_engine(|e| {
        let shift = e.shifts().current().cloned();
        let expected_cash = shift.as_ref().map(Shift::expected_cash);
        ShiftStatusResponse {
            open: shift.is_some(),
            expected_display: expected_cash.map(|m| config.format_money(m)),
            expected_cash,
            shift,
        }
    })
}

/// What closing now with `counted_cash` would report. Changes nothing.
pub fn preview_close(engine: &EngineState, counted_cash: i64) -> Result<Reconciliation, ApiError> {
    debug!(counted_cash, "preview_close command");
    Ok(engine.with_engine(|e| e.preview_close(Money::from_minor(counted_cash)))?)
}

/// Closed shifts, oldest first.
pub fn shift_history(engine: &EngineState) -> Vec<Shift> {
    debug!("shift_history command");
    engine.with_engine(|e| e.shifts().history().to_vec())
}

/// A shift's counters next to the ledger's record of it.
pub fn shift_report(engine: &EngineState, shift_id: &str) -> Result<ShiftAttribution, ApiError> {
    debug!(shift_id = %shift_id, "shift_report command");
    Ok(engine.with_engine(|e| e.shift_attribution(shift_id))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{checkout, CheckoutRequest};
    use crate::commands::test_support::Harness;
    use crate::error::ErrorCode;
    use till_core::{PaymentMethod, StoreKey};

    #[tokio::test]
    async fn test_open_requires_sign_in() {
        let h = Harness::new().await;
        let err = open_shift(&h.engine, &h.db, &h.session, 50000).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotSignedIn);
    }

    #[tokio::test]
    async fn test_open_sell_and_status() {
        let h = Harness::new().await;
        h.sign_in("cajero");
        let coffee = h.product("Café Americano", 2500, 50);

        let shift = open_shift(&h.engine, &h.db, &h.session, 50000).unwrap();
        assert_eq!(shift.cashier, "Cajero");

        h.engine.with_engine_mut(|e| e.add_to_cart(&coffee.id, 1)).unwrap();
        checkout(&h.engine, &h.db, &h.session, &h.config, CheckoutRequest::default()).unwrap();

        let status = current_shift(&h.engine, &h.config);
        assert!(status.open);
        assert_eq!(status.expected_cash, Some(Money::from_minor(52500)));
        assert_eq!(status.expected_display.as_deref(), Some("$52500"));

        let err = open_shift(&h.engine, &h.db, &h.session, 1000).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShiftAlreadyOpen);
    }

    #[tokio::test]
    async fn test_close_short_drawer() {
        let h = Harness::new().await;
        h.sign_in("cajero");
        let x = h.product("Cappuccino", 2000, 10);
        let y = h.product("Espresso", 1500, 10);

        open_shift(&h.engine, &h.db, &h.session, 50000).unwrap();
        h.engine.with_engine_mut(|e| e.add_to_cart(&x.id, 3)).unwrap();
        h.engine.with_engine_mut(|e| e.add_to_cart(&y.id, 2)).unwrap();
        checkout(
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

        let preview = preview_close(&h.engine, 58500).unwrap();
        assert_eq!(preview.discrepancy, Money::from_minor(-500));
        assert!(current_shift(&h.engine, &h.config).open);

        let closed = close_shift(
            &h.engine,
            &h.db,
            &h.session,
            &h.config,
            58500,
            Some("  faltan 500  ".to_string()),
        )
        .unwrap();

        let reconciliation = closed.shift.reconciliation.unwrap();
        assert_eq!(reconciliation.expected, Money::from_minor(59000));
        assert_eq!(reconciliation.classification, Classification::Short);
        assert_eq!(closed.discrepancy_display, "-$500");
        assert_eq!(closed.shift.note.as_deref(), Some("faltan 500"));
        assert!(!closed.attribution.diverges());

        let err = close_shift(&h.engine, &h.db, &h.session, &h.config, 58500, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShiftNotOpen);
        assert_eq!(shift_history(&h.engine).len(), 1);

        h.db.flush().await;
        let store = h.db.inner().documents();
        assert!(store.load::<Shift>(StoreKey::ShiftCurrent).await.unwrap().is_none());
        let history: Vec<Shift> = store.load(StoreKey::ShiftHistory).await.unwrap().unwrap();
        assert_eq!(history[0].id, closed.shift.id);

        let report = shift_report(&h.engine, &closed.shift.id).unwrap();
        assert_eq!(report.ledger_sales_total, Money::from_minor(9000));
    }

    #[tokio::test]
    async fn test_preview_without_shift() {
        let h = Harness::new().await;
        let err = preview_close(&h.engine, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ShiftNotOpen);
        assert!(shift_report(&h.engine, "nope").is_err());
    }
}
