//! # Validation Module
//!
//! Input validation for sale requests, run before any database work.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: RPC deserialization (serde) ── shape and types               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE ── business rule validation                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  ├── UNIQUE (transaction_number)                                       │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Percentage;
use crate::types::NewTransaction;
use crate::{MAX_CART_ITEMS, MAX_CUSTOMER_NAME_LEN, MAX_ITEM_QUANTITY, MAX_NOTES_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a discount percentage (0% to 100%).
pub fn validate_discount(pct: Percentage) -> ValidationResult<()> {
    if pct.bps() > Percentage::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount_percentage".to_string(),
            min: 0,
            max: (Percentage::MAX_BPS / 100) as i64,
        });
    }
    Ok(())
}

/// Validates an optional free-text field against a maximum length.
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<()> {
    if let Some(v) = value {
        if v.chars().count() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            });
        }
    }
    Ok(())
}

/// Validates an entity id (non-empty after trimming).
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a whole sale request.
///
/// ## Rules
/// - At least one line, at most MAX_CART_ITEMS
/// - Every line has a product id and a quantity in 1..=999
/// - Discount within 0..=100%
/// - Payment amount not negative
/// - Customer name and notes within length limits
pub fn validate_new_transaction(req: &NewTransaction) -> CoreResult<()> {
    if req.items.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if req.items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    for line in &req.items {
        validate_id("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    validate_discount(req.discount_percentage)?;

    if req.payment_amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "payment_amount".to_string(),
            min: 0,
            max: i64::MAX,
        }
        .into());
    }

    validate_optional_text(
        "customer_name",
        req.customer_name.as_deref(),
        MAX_CUSTOMER_NAME_LEN,
    )?;
    validate_optional_text("notes", req.notes.as_deref(), MAX_NOTES_LEN)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CartLine, PaymentMethod};

    fn request(lines: Vec<(&str, i64)>) -> NewTransaction {
        NewTransaction {
            customer_name: None,
            items: lines
                .into_iter()
                .map(|(id, q)| CartLine {
                    product_id: id.to_string(),
                    quantity: q,
                })
                .collect(),
            discount_percentage: Percentage::zero(),
            payment_method: PaymentMethod::Cash,
            payment_amount: Money::from_cents(10000),
            notes: None,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = validate_new_transaction(&request(vec![])).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_cart_too_large_rejected() {
        let lines = (0..=MAX_CART_ITEMS).map(|_| ("p", 1)).collect();
        let err = validate_new_transaction(&request(lines)).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
    }

    #[test]
    fn test_line_rules() {
        assert!(validate_new_transaction(&request(vec![("p-1", 2)])).is_ok());
        assert!(validate_new_transaction(&request(vec![("p-1", 0)])).is_err());
        assert!(validate_new_transaction(&request(vec![("  ", 1)])).is_err());
    }

    #[test]
    fn test_payment_and_discount_rules() {
        let mut req = request(vec![("p-1", 1)]);
        req.payment_amount = Money::from_cents(-1);
        assert!(validate_new_transaction(&req).is_err());

        let mut req = request(vec![("p-1", 1)]);
        req.discount_percentage = Percentage::from_bps(10_001);
        assert!(validate_new_transaction(&req).is_err());
    }

    #[test]
    fn test_notes_length() {
        let mut req = request(vec![("p-1", 1)]);
        req.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(validate_new_transaction(&req).is_err());
    }
}
