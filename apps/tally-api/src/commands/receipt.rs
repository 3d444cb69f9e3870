//! # Receipt Commands
//!
//! Receipt data for a stored transaction. Everything comes from the
//! transaction's own snapshot fields, so a receipt reprinted next month
//! matches the one printed at the till even if the catalog changed.
//!
//! ## Layout (as a client would print it)
//! ```text
//! ┌──────────────────────────────────┐
//! │           Warung Maju            │  ← store_name
//! │          Jl. Merdeka 1           │  ← store_address
//! │ TRX-20261017-143015-7F3A         │
//! │ 2026-10-17 21:30   cashier-1     │
//! │──────────────────────────────────│
//! │ Kopi Susu      2 x 15.00   30.00 │  ← items (snapshots)
//! │──────────────────────────────────│
//! │ Subtotal                   60.00 │
//! │ Discount (10.00%)          -6.00 │
//! │ TOTAL                      54.00 │
//! │ Cash                      100.00 │
//! │ Change                     46.00 │
//! └──────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::commands::transaction::TransactionIdParams;
use crate::error::ApiError;
use crate::state::AppState;
use tally_core::{CoreError, Money, Percentage, TransactionDetail, TransactionStatus};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub transaction_id: String,
    pub transaction_number: String,
    pub store_name: String,
    pub store_address: Vec<String>,
    pub currency_symbol: String,
    /// Local time, `YYYY-MM-DD HH:MM`
    pub timestamp: String,
    pub cashier: String,
    pub customer_name: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Money,
    pub discount_percentage: Percentage,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    /// Display label, e.g. "QRIS"
    pub payment_method: String,
    pub payment_amount: Money,
    pub change_amount: Money,
    pub status: TransactionStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

pub async fn get_receipt(state: &AppState, params: TransactionIdParams) -> Result<Receipt, ApiError> {
    debug!(id = %params.id, "getReceipt command");

    let detail = state
        .db
        .transactions()
        .get_by_id(&params.id)
        .await?
        .ok_or_else(|| CoreError::TransactionNotFound(params.id.clone()))?;

    Ok(build_receipt(state, detail))
}

fn build_receipt(state: &AppState, detail: TransactionDetail) -> Receipt {
    let TransactionDetail { transaction: t, items } = detail;

    Receipt {
        transaction_id: t.id,
        transaction_number: t.transaction_number,
        store_name: state.config.store_name.clone(),
        store_address: state.config.store_address.clone(),
        currency_symbol: state.config.currency_symbol.clone(),
        timestamp: t
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        cashier: t.user_id,
        customer_name: t.customer_name,
        items: items
            .into_iter()
            .map(|i| ReceiptItem {
                name: i.product_name,
                quantity: i.quantity,
                unit_price: i.unit_price,
                total_price: i.total_price,
            })
            .collect(),
        subtotal: t.subtotal,
        discount_percentage: t.discount_percentage,
        discount_amount: t.discount_amount,
        tax_amount: t.tax_amount,
        total_amount: t.total_amount,
        payment_method: t.payment_method.label().to_string(),
        payment_amount: t.payment_amount,
        change_amount: t.change_amount,
        status: t.status,
        notes: t.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{product, sale, state};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_receipt_uses_snapshots_and_config() {
        let state = state().await;
        let a = product(&state, "Kopi Susu", 1500, 10).await;
        let b = product(&state, "Roti", 3000, 10).await;
        let created = state
            .db
            .engine()
            .create_transaction(&sale(&[(&a, 2), (&b, 1)], 10, 10_000), "cashier-1")
            .await
            .unwrap();

        // Price change after the sale must not show up on the receipt
        let mut p = state.db.products().get_by_id(&a).await.unwrap().unwrap();
        p.selling_price = Money::from_cents(9900);
        state.db.products().update(&p).await.unwrap();

        let receipt = get_receipt(
            &state,
            TransactionIdParams {
                id: created.transaction.id.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(receipt.store_name, "Warung Maju");
        assert_eq!(receipt.store_address, vec!["Jl. Merdeka 1", "Bandung"]);
        assert_eq!(receipt.cashier, "cashier-1");
        assert_eq!(receipt.payment_method, "Cash");
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items[0].name, "Kopi Susu");
        assert_eq!(receipt.items[0].unit_price, Money::from_cents(1500));
        assert_eq!(receipt.subtotal, Money::from_cents(6000));
        assert_eq!(receipt.discount_amount, Money::from_cents(600));
        assert_eq!(receipt.total_amount, Money::from_cents(5400));
        assert_eq!(receipt.change_amount, Money::from_cents(4600));
    }

    #[tokio::test]
    async fn test_receipt_for_missing_transaction() {
        let state = state().await;
        let err = get_receipt(&state, TransactionIdParams { id: "x".to_string() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
