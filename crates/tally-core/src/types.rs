//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  transaction_id │       │
//! │  │  sku            │   │  number         │   │  product_name ❄ │       │
//! │  │  selling_price  │   │  status         │   │  unit_price   ❄ │       │
//! │  │  stock_quantity │   │  total_amount   │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = snapshot field, frozen at the moment of sale                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, transaction_number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percentage};

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Optional category.
    pub category_id: Option<String>,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Current selling price.
    pub selling_price: Money,

    /// Units on hand. Never negative.
    pub stock_quantity: i64,

    /// Restock threshold for the low-stock dashboard.
    pub min_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks if the requested quantity can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock_quantity >= quantity
    }

    /// Checks if stock is at or below the restock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a sales transaction.
///
/// Sales are created directly as `Completed`; `Pending` and `Cancelled`
/// are only reached through explicit status updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Parked, awaiting completion.
    Pending,
    /// Paid and finalized; its items have consumed stock.
    Completed,
    /// Cancelled; stock consumed by a completed sale has been restored.
    Cancelled,
}

impl TransactionStatus {
    /// All states, in declaration order.
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Pending,
        TransactionStatus::Completed,
        TransactionStatus::Cancelled,
    ];

    /// Lowercase name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            _ => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown status '{}'", s),
            }),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Debit/credit card on an external terminal.
    Card,
    /// QR code payment.
    Qris,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Qris => "QRIS",
            PaymentMethod::Transfer => "Transfer",
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A persisted sale.
///
/// ## Invariants
/// - `total_amount = subtotal − discount_amount + tax_amount`
/// - `change_amount = max(0, payment_amount − total_amount)`
/// - `subtotal = Σ items.total_price`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub transaction_number: String,
    /// Cashier who created the sale.
    pub user_id: String,
    pub customer_name: Option<String>,
    pub subtotal: Money,
    pub discount_percentage: Percentage,
    pub discount_amount: Money,
    /// Always zero; there is no tax engine.
    pub tax_percentage: Percentage,
    /// Always zero; there is no tax engine.
    pub tax_amount: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub payment_amount: Money,
    pub change_amount: Money,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Selling price at time of sale (frozen).
    pub unit_price: Money,
    /// unit_price × quantity.
    pub total_price: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A transaction together with all of its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Sale Request
// =============================================================================

/// One requested line of a sale: which product and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Everything the caller supplies to ring up a sale.
///
/// Prices are never accepted from the caller; they are read from the
/// catalog inside the sale's atomic unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTransaction {
    #[serde(default)]
    pub customer_name: Option<String>,
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub discount_percentage: Percentage,
    pub payment_method: PaymentMethod,
    pub payment_amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min_stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            category_id: None,
            sku: "KOPI-01".to_string(),
            name: "Kopi Susu".to_string(),
            selling_price: Money::from_cents(1500),
            stock_quantity: stock,
            min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_sell() {
        let p = product(3, 0);
        assert!(p.can_sell(3));
        assert!(!p.can_sell(4));

        let inactive = Product {
            is_active: false,
            ..product(10, 0)
        };
        assert!(!inactive.can_sell(1));
    }

    #[test]
    fn test_low_stock() {
        assert!(product(5, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in TransactionStatus::ALL {
            assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<TransactionStatus>().is_err());
        assert_eq!(
            " Cancelled ".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Cancelled
        );
    }

    #[test]
    fn test_new_transaction_defaults() {
        let json = r#"{
            "items": [{"product_id": "p-1", "quantity": 2}],
            "payment_method": "cash",
            "payment_amount": 100.00
        }"#;
        let req: NewTransaction = serde_json::from_str(json).unwrap();
        assert!(req.discount_percentage.is_zero());
        assert!(req.customer_name.is_none());
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.payment_method, PaymentMethod::Cash);
        assert_eq!(req.payment_amount, Money::from_cents(10_000));
    }

    #[test]
    fn test_new_transaction_reads_percent_and_decimal_amounts() {
        let json = r#"{
            "items": [{"product_id": "p-1", "quantity": 1}],
            "discount_percentage": 10,
            "payment_method": "qris",
            "payment_amount": 54.5
        }"#;
        let req: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(req.discount_percentage, Percentage::from_whole(10));
        assert_eq!(req.payment_amount, Money::from_cents(5450));

        let too_precise = json.replace("54.5", "54.555");
        assert!(serde_json::from_str::<NewTransaction>(&too_precise).is_err());
    }
}
