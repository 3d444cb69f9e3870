//! # Tally API Library
//!
//! The command layer of Tally POS: typed operations over the database,
//! exposed as JSON-lines RPC on stdin/stdout.
//!
//! ## Module Organization
//! ```text
//! tally_api/
//! ├── lib.rs          ◄─── You are here (startup helpers)
//! ├── config.rs       ◄─── Environment configuration
//! ├── state.rs        ◄─── Shared AppState (Database + config)
//! ├── rpc.rs          ◄─── Envelope parsing, routing, serve loop
//! ├── commands/
//! │   ├── transaction.rs  ◄─── create / status / list / lookup
//! │   ├── report.rs       ◄─── dashboard aggregates
//! │   └── receipt.rs      ◄─── receipt data
//! └── error.rs        ◄─── ApiError { code, message, retryable }
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging ── tracing-subscriber to stderr, RUST_LOG        │
//! │  2. Load ApiConfig ────── TALLY_* environment variables                 │
//! │  3. Open Database ─────── SQLite WAL, run pending migrations            │
//! │  4. Serve ─────────────── stdin lines → commands → stdout lines         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod rpc;
pub mod state;

use tally_db::{Database, DbConfig, DbResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr; stdout is reserved for RPC responses.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_db=trace` - Trace the database layer only
/// - Default: `info,tally=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the database described by `config` and builds the shared state.
pub async fn open(config: ApiConfig) -> DbResult<AppState> {
    info!(path = %config.db_path.display(), "Opening database");

    let db_config = DbConfig::new(&config.db_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config).await?;

    info!("Database connected and migrations applied");
    Ok(AppState::new(db, config))
}
