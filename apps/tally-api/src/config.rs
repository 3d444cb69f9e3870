//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                   | Default                          |
//! |----------------------------|----------------------------------|
//! | `TALLY_DB_PATH`            | `<platform data dir>/tally.db`   |
//! | `TALLY_DB_MAX_CONNECTIONS` | `5`                              |
//! | `TALLY_STORE_NAME`         | `Tally POS`                      |
//! | `TALLY_STORE_ADDRESS`      | empty; lines separated by `\|`   |
//! | `TALLY_CURRENCY_SYMBOL`    | `$`                              |

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Store name (printed on receipts)
    pub store_name: String,

    /// Store address lines (printed on receipts)
    pub store_address: Vec<String>,

    /// Currency symbol for display
    pub currency_symbol: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("TALLY_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let db_max_connections: u32 = lookup("TALLY_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_DB_MAX_CONNECTIONS".to_string()))?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("TALLY_DB_MAX_CONNECTIONS".to_string()));
        }

        let store_address = lookup("TALLY_STORE_ADDRESS")
            .map(|raw| {
                raw.split('|')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ApiConfig {
            db_path,
            db_max_connections,
            store_name: lookup("TALLY_STORE_NAME").unwrap_or_else(|| "Tally POS".to_string()),
            store_address,
            currency_symbol: lookup("TALLY_CURRENCY_SYMBOL").unwrap_or_else(|| "$".to_string()),
        })
    }
}

/// Platform-specific data directory.
///
/// - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
/// - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
/// - **Linux**: `~/.local/share/pos/tally.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "tally", "pos").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("tally.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory; set TALLY_DB_PATH")]
    NoDataDir,
}
