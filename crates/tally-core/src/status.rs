//! # Status Transitions
//!
//! The transaction state machine as an explicit table keyed by
//! `(from, to)`.
//!
//! ```text
//! ┌──────────────┬───────────┬───────────┬───────────┐
//! │ from \ to    │ pending   │ completed │ cancelled │
//! ├──────────────┼───────────┼───────────┼───────────┤
//! │ pending      │ -         │ -         │ -         │
//! │ completed    │ -         │ -         │ RESTORE   │
//! │ cancelled    │ -         │ -         │ -         │
//! └──────────────┴───────────┴───────────┴───────────┘
//!   RESTORE = every item's quantity goes back to its product's stock
//!   -       = status and updated_at written, stock untouched
//! ```
//!
//! No transition is refused. Stock is consumed when a sale is created
//! (which always lands in `completed`), so `completed → cancelled` is the
//! only edge that has stock to give back.

use serde::Serialize;

use crate::types::TransactionStatus;

/// Side effect on product stock attached to a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockEffect {
    /// Only the status column changes.
    None,
    /// Increment each item's product stock by the item quantity.
    RestoreStock,
}

/// A planned status change and its stock effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: TransactionStatus,
    pub to: TransactionStatus,
    pub effect: StockEffect,
}

impl Transition {
    /// Looks up the `(from, to)` pair in the transition table.
    pub const fn plan(from: TransactionStatus, to: TransactionStatus) -> Transition {
        use TransactionStatus::*;

        let effect = match (from, to) {
            (Completed, Cancelled) => StockEffect::RestoreStock,

            (Pending, Pending) => StockEffect::None,
            (Pending, Completed) => StockEffect::None,
            (Pending, Cancelled) => StockEffect::None,
            (Completed, Pending) => StockEffect::None,
            (Completed, Completed) => StockEffect::None,
            (Cancelled, Pending) => StockEffect::None,
            (Cancelled, Completed) => StockEffect::None,
            (Cancelled, Cancelled) => StockEffect::None,
        };

        Transition { from, to, effect }
    }

    /// Status every new sale is created in.
    pub const fn initial() -> TransactionStatus {
        TransactionStatus::Completed
    }

    #[inline]
    pub const fn restores_stock(&self) -> bool {
        matches!(self.effect, StockEffect::RestoreStock)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use TransactionStatus::*;

    #[test]
    fn test_only_completed_to_cancelled_restores_stock() {
        for from in TransactionStatus::ALL {
            for to in TransactionStatus::ALL {
                let t = Transition::plan(from, to);
                assert_eq!(t.from, from);
                assert_eq!(t.to, to);
                assert_eq!(
                    t.restores_stock(),
                    from == Completed && to == Cancelled,
                    "unexpected effect for {} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_repeated_cancel_is_stock_noop() {
        assert_eq!(Transition::plan(Cancelled, Cancelled).effect, StockEffect::None);
    }

    #[test]
    fn test_initial_status_is_completed() {
        assert_eq!(Transition::initial(), Completed);
    }
}
