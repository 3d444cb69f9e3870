//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the **heart** of Tally POS. It contains the sale math,
//! the status state machine and all domain types as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Client Application                           │   │
//! │  │        Cart UI ──► Tender UI ──► Receipt UI ──► Dashboard       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON RPC                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-api (commands)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ pricing │ │ status  │ │numbering│  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          tally-db (SQLite, repositories, engine)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, TransactionItem, ...)
//! - [`money`] - Money and Percentage with integer arithmetic
//! - [`pricing`] - Subtotal/discount/tax/total/change calculator
//! - [`status`] - Transaction status transition table
//! - [`numbering`] - Transaction number generation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::{Money, Percentage};
//! use tally_core::pricing::{calculate_totals, PriceLine};
//!
//! let lines = [
//!     PriceLine::new(Money::from_cents(1500), 2),
//!     PriceLine::new(Money::from_cents(3000), 1),
//! ];
//! let totals = calculate_totals(
//!     &lines,
//!     Percentage::from_bps(1000),
//!     Money::from_cents(10000),
//! )
//! .unwrap();
//!
//! assert_eq!(totals.subtotal.cents(), 6000);
//! assert_eq!(totals.discount_amount.cents(), 600);
//! assert_eq!(totals.total_amount.cents(), 5400);
//! assert_eq!(totals.change_amount.cents(), 4600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod pricing;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percentage};
pub use numbering::{TimestampNumberGenerator, TransactionNumberGenerator};
pub use pricing::{calculate_totals, PriceLine, SaleTotals};
pub use status::{StockEffect, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of free-text fields (customer name).
pub const MAX_CUSTOMER_NAME_LEN: usize = 100;

/// Maximum length of transaction notes.
pub const MAX_NOTES_LEN: usize = 500;
