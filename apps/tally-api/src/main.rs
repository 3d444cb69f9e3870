//! # Tally API Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          tally-api process                              │
//! │                                                                         │
//! │  client ── stdin (JSON lines) ──► rpc::serve ──► commands ──► SQLite   │
//! │  client ◄─ stdout (JSON lines) ─┘                                       │
//! │  logs ───► stderr                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;

use tally_api::config::ApiConfig;
use tally_api::{init_tracing, open, rpc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Tally POS API");

    let config = ApiConfig::load().context("Failed to load configuration")?;

    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let state = Arc::new(open(config).await.context("Failed to open database")?);

    info!("Ready for requests on stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    rpc::serve(state.clone(), stdin, tokio::io::stdout())
        .await
        .context("RPC loop failed")?;

    state.db.close().await;
    info!("Input closed, shutting down");

    Ok(())
}
