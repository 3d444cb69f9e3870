//! # tally-db: Database Layer for Tally POS
//!
//! This crate provides database access for the Tally POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  RPC command (createTransaction)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐   │   │
//! │  │   │ SaleEngine    │  │ Repositories  │  │   Migrations     │   │   │
//! │  │   │ (engine.rs)   │  │ product       │  │   (embedded)     │   │   │
//! │  │   │ create/cancel │─►│ transaction   │  │ 001_initial.sql  │   │   │
//! │  │   │ atomic units  │  │ report        │  │                  │   │   │
//! │  │   └───────────────┘  └───────────────┘  └──────────────────┘   │   │
//! │  │            │                                                    │   │
//! │  │            ▼                                                    │   │
//! │  │   Database (pool.rs) ── SqlitePool, WAL, busy timeout           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and engine error types
//! - [`repository`] - Repository implementations
//! - [`engine`] - Transaction engine (sale creation, status changes)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tally.db")).await?;
//! let sale = db.engine().create_transaction(&request, "cashier-1").await?;
//! let summary = db.reports().today_sales_summary().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::SaleEngine;
pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::report::{ReportRepository, SalesSummary};
pub use repository::transaction::{Pagination, TransactionFilter, TransactionPage, TransactionRepository};
