//! # Pricing & Totals
//!
//! Derives every monetary field of a sale from its lines.
//!
//! ## Formula
//! ```text
//! line_total      = unit_price × quantity
//! subtotal        = Σ line_total
//! discount_amount = round2(subtotal × discount% / 100)
//! tax_amount      = 0
//! total_amount    = subtotal − discount_amount + tax_amount
//! change_amount   = max(0, payment_amount − total_amount)
//! ```
//!
//! Prices are whole cents, so `line_total` needs no rounding; the discount is
//! the only step that rounds (half-up, see [`Money::percentage_of`]).

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::{Money, Percentage};

/// One priced line: a snapshotted unit price and the quantity sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLine {
    pub unit_price: Money,
    pub quantity: i64,
}

impl PriceLine {
    pub const fn new(unit_price: Money, quantity: i64) -> Self {
        PriceLine {
            unit_price,
            quantity,
        }
    }
}

/// Computed monetary fields of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    /// Per-line totals, in input order.
    pub line_totals: Vec<Money>,
    pub subtotal: Money,
    pub discount_percentage: Percentage,
    pub discount_amount: Money,
    pub tax_percentage: Percentage,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub payment_amount: Money,
    pub change_amount: Money,
}

/// Calculates subtotal, discount, tax, total and change.
///
/// ## Errors
/// - `OutOfRange` if the discount exceeds 100%
/// - `Overflow` if any sum or product leaves the i64 range
///
/// ## Example
/// ```rust
/// use tally_core::money::{Money, Percentage};
/// use tally_core::pricing::{calculate_totals, PriceLine};
///
/// let totals = calculate_totals(
///     &[PriceLine::new(Money::from_cents(1500), 2)],
///     Percentage::zero(),
///     Money::from_cents(2000),
/// )
/// .unwrap();
/// assert_eq!(totals.total_amount.cents(), 3000);
/// assert_eq!(totals.change_amount, Money::zero()); // underpaid → no change
/// ```
pub fn calculate_totals(
    lines: &[PriceLine],
    discount_percentage: Percentage,
    payment_amount: Money,
) -> CoreResult<SaleTotals> {
    if discount_percentage.bps() > Percentage::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount_percentage".to_string(),
            min: 0,
            max: (Percentage::MAX_BPS / 100) as i64,
        }
        .into());
    }

    let mut line_totals = Vec::with_capacity(lines.len());
    let mut subtotal = Money::zero();
    for line in lines {
        let line_total = line
            .unit_price
            .checked_mul_quantity(line.quantity)
            .ok_or_else(|| overflow("total_price"))?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| overflow("subtotal"))?;
        line_totals.push(line_total);
    }

    let discount_amount = subtotal.percentage_of(discount_percentage);

    // No tax engine: tax fields exist on the record but stay zero.
    let tax_percentage = Percentage::zero();
    let tax_amount = Money::zero();

    let total_amount = subtotal
        .checked_sub(discount_amount)
        .and_then(|m| m.checked_add(tax_amount))
        .ok_or_else(|| overflow("total_amount"))?;

    let change_amount = payment_amount
        .checked_sub(total_amount)
        .ok_or_else(|| overflow("change_amount"))?
        .clamp_non_negative();

    Ok(SaleTotals {
        line_totals,
        subtotal,
        discount_percentage,
        discount_amount,
        tax_percentage,
        tax_amount,
        total_amount,
        payment_amount,
        change_amount,
    })
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    #[test]
    fn test_reference_cart() {
        // [A 15.00 × 2, B 30.00 × 1], 10% off, paid 100.00
        let totals = calculate_totals(
            &[PriceLine::new(cents(1500), 2), PriceLine::new(cents(3000), 1)],
            Percentage::from_whole(10),
            cents(10000),
        )
        .unwrap();

        assert_eq!(totals.line_totals, vec![cents(3000), cents(3000)]);
        assert_eq!(totals.subtotal, cents(6000));
        assert_eq!(totals.discount_amount, cents(600));
        assert_eq!(totals.tax_amount, Money::zero());
        assert_eq!(totals.total_amount, cents(5400));
        assert_eq!(totals.change_amount, cents(4600));
    }

    #[test]
    fn test_totals_identity_holds_for_awkward_values() {
        let prices = [1, 7, 99, 333, 1099, 12345];
        let discounts = [0, 1, 333, 1250, 5000, 9999, 10000];
        for &p in &prices {
            for qty in 1..=7 {
                for &bps in &discounts {
                    let lines = [PriceLine::new(cents(p), qty), PriceLine::new(cents(p + 1), 1)];
                    let t = calculate_totals(&lines, Percentage::from_bps(bps), cents(0)).unwrap();

                    let line_sum: Money = t.line_totals.iter().copied().sum();
                    assert_eq!(t.subtotal, line_sum);
                    assert_eq!(t.total_amount, t.subtotal - t.discount_amount);
                    assert!(t.discount_amount <= t.subtotal);
                    assert!(!t.total_amount.is_negative());
                }
            }
        }
    }

    #[test]
    fn test_full_discount_makes_sale_free() {
        let t = calculate_totals(
            &[PriceLine::new(cents(999), 3)],
            Percentage::from_whole(100),
            cents(0),
        )
        .unwrap();
        assert_eq!(t.total_amount, Money::zero());
        assert_eq!(t.change_amount, Money::zero());
    }

    #[test]
    fn test_exact_payment_gives_zero_change() {
        let t = calculate_totals(&[PriceLine::new(cents(250), 4)], Percentage::zero(), cents(1000))
            .unwrap();
        assert_eq!(t.change_amount, Money::zero());
    }

    #[test]
    fn test_discount_over_100_percent_rejected() {
        let err = calculate_totals(
            &[PriceLine::new(cents(100), 1)],
            Percentage::from_bps(10_001),
            cents(0),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let err = calculate_totals(
            &[PriceLine::new(cents(i64::MAX / 2), 3)],
            Percentage::zero(),
            cents(0),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Overflow { .. })));
    }
}
