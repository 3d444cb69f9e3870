//! # Transaction Numbers
//!
//! Human-readable, time-ordered identifiers printed on receipts.
//!
//! ## Format
//! `TRX-YYYYMMDD-HHMMSS-XXXX`
//! - YYYYMMDD-HHMMSS: creation time (UTC)
//! - XXXX: 4 random uppercase hex digits
//!
//! ## Example
//! `TRX-20261017-143015-7F3A`
//!
//! Two sales in the same second collide with probability 1/65536. The
//! `UNIQUE` index on `transactions.transaction_number` is the final
//! authority: the sale engine regenerates and retries when it fires.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of transaction numbers.
///
/// The sale engine holds one of these so tests can force collisions.
pub trait TransactionNumberGenerator: Send + Sync {
    fn generate(&self, at: DateTime<Utc>) -> String;
}

/// Default generator: timestamp plus a random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampNumberGenerator;

impl TransactionNumberGenerator for TimestampNumberGenerator {
    fn generate(&self, at: DateTime<Utc>) -> String {
        let suffix = (Uuid::new_v4().as_u128() & 0xFFFF) as u16;
        format!("TRX-{}-{:04X}", at.format("%Y%m%d-%H%M%S"), suffix)
    }
}
