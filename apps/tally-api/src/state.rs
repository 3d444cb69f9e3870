//! # Application State
//!
//! Everything a command may need, shared across concurrent requests.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is safe to use from many tasks at
//! once. Configuration is read-only after startup, so no locking is needed.

use tally_db::Database;

use crate::config::ApiConfig;

/// Shared state handed to every command.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState { db, config }
    }
}
