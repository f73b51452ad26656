//! # Till POS Terminal
//!
//! Operator console that wires the engine, the document store and the
//! session together.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Terminal Startup                                     │
//! │                                                                         │
//! │  main()                                                                 │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  run()                                                                  │
//! │    │                                                                    │
//! │    ├──► init_tracing()           RUST_LOG or info,till=debug,sqlx=warn  │
//! │    │                                                                    │
//! │    ├──► ConfigState::from_env()  TILL_* overrides                       │
//! │    │                                                                    │
//! │    ├──► get_database_path()      TILL_DB_PATH or the platform data dir  │
//! │    │                                                                    │
//! │    ├──► Database::new()          pool + migrations                      │
//! │    │                                                                    │
//! │    ├──► load_snapshot()          catalog, ledger, shifts, session user  │
//! │    │                                                                    │
//! │    ├──► Engine::restore()        rejects corrupt shift documents        │
//! │    │                                                                    │
//! │    ├──► DbState::spawn()         background writer                      │
//! │    │                                                                    │
//! │    └──► run_console()            until EOF or quit, then flush          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod console;
pub mod error;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use console::Terminal;
use error::ApiError;
use state::{ConfigState, DbState, EngineState, SessionState};
use till_core::{Engine, RolePolicy};
use till_db::{Database, DbConfig};

/// Entry point for the console.
pub async fn run() -> Result<(), ApiError> {
    init_tracing();

    info!("Starting Till POS terminal v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigState::from_env();
    let db_path = get_database_path()?;
    info!(path = %db_path.display(), "Database path");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let terminal = restore_terminal(db, config).await?;

    console::run_console(&terminal).await?;

    terminal.db.inner().close().await;
    info!("Terminal stopped");
    Ok(())
}

/// Rebuilds every state from what the database holds.
pub async fn restore_terminal(db: Database, config: ConfigState) -> Result<Terminal, ApiError> {
    let snapshot = db.documents().load_snapshot().await?;
    let session_user = snapshot.session_user.clone();

    let engine = Engine::restore(snapshot, Box::new(RolePolicy))?;
    info!(
        products = engine.catalog().len(),
        sales = engine.ledger().len(),
        shift_open = engine.shifts().is_open(),
        "Engine restored"
    );

    if let Some(actor) = &session_user {
        info!(username = %actor.username, "Session restored");
    }

    Ok(Terminal::new(
        EngineState::new(engine),
        DbState::spawn(db),
        SessionState::new(session_user),
        config,
    ))
}

/// Initializes the tracing subscriber.
///
/// Log levels can be controlled via the `RUST_LOG` environment variable:
/// - `RUST_LOG=debug` - Show all debug logs
/// - `RUST_LOG=till=trace` - Trace level for till crates only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    // Logs go to stderr so stdout stays clean for responses.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

/// Gets the database file path.
///
/// ## Location
/// - Linux: `~/.local/share/pos/till.db`
/// - macOS: `~/Library/Application Support/com.till.pos/till.db`
/// - Windows: `C:\Users\<user>\AppData\Roaming\till\pos\data\till.db`
///
/// ## Override
/// Set `TILL_DB_PATH` to use a custom location.
fn get_database_path() -> Result<PathBuf, ApiError> {
    if let Ok(path) = std::env::var("TILL_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "till", "pos")
        .ok_or_else(|| ApiError::internal("Could not determine a data directory; set TILL_DB_PATH"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("till.db"))
}
