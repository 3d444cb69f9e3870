//! # Commands Module
//!
//! Every operation a client can call, one async function per RPC method.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── transaction.rs  ◄─── create, status change, list, lookup
//! ├── report.rs       ◄─── dashboard aggregates
//! └── receipt.rs      ◄─── receipt data for printing
//! ```
//!
//! ## Command Shape
//! ```rust,ignore
//! pub async fn get_transaction_by_id(
//!     state: &AppState,          ◄── shared pool + config
//!     params: TransactionIdParams,  ◄── deserialized from "params"
//! ) -> Result<TransactionDetail, ApiError>
//! ```
//! The RPC loop (`rpc.rs`) owns JSON parsing and method routing; commands
//! only see typed values.

pub mod receipt;
pub mod report;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_support {
    use tally_core::{CartLine, Money, NewTransaction, PaymentMethod, Percentage};
    use tally_db::{Database, DbConfig, NewProduct};

    use crate::config::ApiConfig;
    use crate::state::AppState;

    pub async fn state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig::from_lookup(|key| match key {
            "TALLY_DB_PATH" => Some(":memory:".to_string()),
            "TALLY_STORE_NAME" => Some("Warung Maju".to_string()),
            "TALLY_STORE_ADDRESS" => Some("Jl. Merdeka 1|Bandung".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(db, config)
    }

    pub async fn product(state: &AppState, sku: &str, price: i64, stock: i64) -> String {
        state
            .db
            .products()
            .insert(NewProduct::new(sku, sku, Money::from_cents(price), stock))
            .await
            .unwrap()
            .id
    }

    pub fn sale(lines: &[(&str, i64)], discount_pct: u32, payment: i64) -> NewTransaction {
        NewTransaction {
            customer_name: None,
            items: lines
                .iter()
                .map(|(id, qty)| CartLine {
                    product_id: id.to_string(),
                    quantity: *qty,
                })
                .collect(),
            discount_percentage: Percentage::from_whole(discount_pct),
            payment_method: PaymentMethod::Cash,
            payment_amount: Money::from_cents(payment),
            notes: None,
        }
    }
}
