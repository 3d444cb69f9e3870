//! # Sale Engine
//!
//! The write side of Tally POS. Every operation here is one atomic unit:
//! either all of its rows change or none do.
//!
//! ## Creating a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_transaction(request, creator)                 │
//! │                                                                         │
//! │  validate_new_transaction(request)        ← no DB access yet           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────┐      │
//! │  │ for each product (cart lines merged, quantities summed):     │      │
//! │  │   UPDATE products SET stock = stock - q                      │      │
//! │  │   WHERE id = ? AND is_active AND stock >= q RETURNING ...    │      │
//! │  │     0 rows → re-read → ProductNotFound | InsufficientStock ──┼─► ROLLBACK
//! │  │     1 row  → snapshot name + price                           │      │
//! │  │ calculate_totals(lines, discount, payment)                   │      │
//! │  │ INSERT transactions (status = completed, fresh number)       │      │
//! │  │ INSERT transaction_items (one per cart line)                 │      │
//! │  COMMIT ◄───────────────────────────────────────────────────────┘      │
//! │       │                                                                 │
//! │       └── UNIQUE(transaction_number) fired? regenerate and retry       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Changing Status
//! The `(old, new)` pair is planned with [`Transition::plan`]. The status
//! write is a compare-and-swap on `old`; stock restoration for
//! `completed → cancelled` runs in the same database transaction, so it
//! happens at most once no matter how many callers race.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::{
    calculate_totals, validation, CartLine, CoreError, Money, NewTransaction, PriceLine,
    Transaction, TransactionDetail, TransactionItem, TransactionNumberGenerator,
    TransactionStatus, Transition,
};

use crate::error::{DbError, EngineError, EngineResult};
use crate::repository::product::{self, ReservedStock};
use crate::repository::transaction::{self, TransactionRepository};

/// Attempts at a fresh transaction number before giving up.
const NUMBER_ATTEMPTS: usize = 3;

/// Attempts at a status compare-and-swap before giving up.
const STATUS_ATTEMPTS: usize = 5;

/// Runs sales and status changes as atomic units of work.
#[derive(Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
    numbers: Arc<dyn TransactionNumberGenerator>,
}

impl std::fmt::Debug for SaleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaleEngine").finish_non_exhaustive()
    }
}

impl SaleEngine {
    pub fn new(pool: SqlitePool, numbers: Arc<dyn TransactionNumberGenerator>) -> Self {
        SaleEngine { pool, numbers }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Rings up a sale: reserves stock, snapshots prices, persists the
    /// transaction and its items.
    ///
    /// ## Errors
    /// * `CoreError::Validation` / `EmptyCart` / `CartTooLarge` - bad request
    /// * `CoreError::ProductNotFound` - unknown or inactive product
    /// * `CoreError::InsufficientStock` - not enough units on hand
    /// * `DbError::UniqueViolation` - number collided on every attempt (retryable)
    pub async fn create_transaction(
        &self,
        request: &NewTransaction,
        creator_id: &str,
    ) -> EngineResult<TransactionDetail> {
        validation::validate_new_transaction(request)?;
        validation::validate_id("creator_id", creator_id)?;

        let mut attempt = 1;
        loop {
            match self.try_create(request, creator_id).await {
                Err(EngineError::Db(err))
                    if err.is_transaction_number_collision() && attempt < NUMBER_ATTEMPTS =>
                {
                    warn!(attempt, "Transaction number collision, retrying");
                    attempt += 1;
                }
                Ok(detail) => {
                    info!(
                        id = %detail.transaction.id,
                        number = %detail.transaction.transaction_number,
                        total = %detail.transaction.total_amount,
                        items = detail.items.len(),
                        "Transaction created"
                    );
                    return Ok(detail);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_create(
        &self,
        request: &NewTransaction,
        creator_id: &str,
    ) -> EngineResult<TransactionDetail> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // One guarded decrement per product, so a product listed twice is
        // checked against its whole quantity
        let mut reserved: HashMap<&str, ReservedStock> = HashMap::new();
        for (product_id, quantity) in demand_per_product(&request.items) {
            match product::decrement_stock(&mut *tx, product_id, quantity, now).await? {
                Some(snapshot) => {
                    reserved.insert(product_id, snapshot);
                }
                None => {
                    let err = explain_rejection(&mut *tx, product_id, quantity).await?;
                    tx.rollback().await?;
                    return Err(err.into());
                }
            }
        }

        let snapshots = request
            .items
            .iter()
            .map(|line| {
                reserved.get(line.product_id.as_str()).ok_or_else(|| {
                    DbError::Internal(format!("no reservation for {}", line.product_id))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let price_lines: Vec<PriceLine> = snapshots
            .iter()
            .zip(&request.items)
            .map(|(snapshot, line)| PriceLine::new(snapshot.selling_price, line.quantity))
            .collect();
        let totals = calculate_totals(
            &price_lines,
            request.discount_percentage,
            request.payment_amount,
        )?;

        let header = Transaction {
            id: Uuid::new_v4().to_string(),
            transaction_number: self.numbers.generate(now),
            user_id: creator_id.to_string(),
            customer_name: request.customer_name.clone(),
            subtotal: totals.subtotal,
            discount_percentage: totals.discount_percentage,
            discount_amount: totals.discount_amount,
            tax_percentage: totals.tax_percentage,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            payment_method: request.payment_method,
            payment_amount: totals.payment_amount,
            change_amount: totals.change_amount,
            status: Transition::initial(),
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(number = %header.transaction_number, "Inserting transaction");
        transaction::insert_transaction(&mut *tx, &header).await?;

        let items = build_items(&header, &snapshots, request, &totals.line_totals);
        for item in &items {
            transaction::insert_item(&mut *tx, item).await?;
        }

        tx.commit().await?;

        Ok(TransactionDetail {
            transaction: header,
            items,
        })
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves a transaction to `new_status`, applying the transition's
    /// stock effect atomically with the status write.
    ///
    /// ## Errors
    /// * `CoreError::TransactionNotFound` - unknown id
    /// * `DbError::TransactionFailed` - lost every compare-and-swap race
    pub async fn update_transaction_status(
        &self,
        id: &str,
        new_status: TransactionStatus,
    ) -> EngineResult<TransactionDetail> {
        let transactions = TransactionRepository::new(self.pool.clone());

        for attempt in 1..=STATUS_ATTEMPTS {
            let current = transactions
                .status_of(id)
                .await?
                .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
            let plan = Transition::plan(current, new_status);

            if self.apply_transition(id, plan).await? {
                info!(
                    id = %id,
                    from = %plan.from,
                    to = %plan.to,
                    restored = plan.restores_stock(),
                    "Transaction status updated"
                );
                return transactions
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()).into());
            }

            debug!(id = %id, attempt, "Status changed concurrently, re-planning");
        }

        Err(DbError::TransactionFailed(format!(
            "status of transaction {} kept changing concurrently",
            id
        ))
        .into())
    }

    /// Returns false if the status was no longer `plan.from`.
    async fn apply_transition(&self, id: &str, plan: Transition) -> EngineResult<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if !transaction::swap_status(&mut *tx, id, plan.from, plan.to, now).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        if plan.restores_stock() {
            let items = transaction::items_of(&mut *tx, id).await?;
            for item in &items {
                product::increment_stock(&mut *tx, &item.product_id, item.quantity, now).await?;
            }
            debug!(id = %id, items = items.len(), "Stock restored");
        }

        tx.commit().await?;
        Ok(true)
    }
}

/// Sums cart quantities per product, in first-seen order.
fn demand_per_product(items: &[CartLine]) -> Vec<(&str, i64)> {
    let mut demand: Vec<(&str, i64)> = Vec::with_capacity(items.len());
    for line in items {
        match demand.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, quantity)) => *quantity += line.quantity,
            None => demand.push((line.product_id.as_str(), line.quantity)),
        }
    }
    demand
}

/// Works out why a guarded decrement matched no row.
async fn explain_rejection(
    conn: &mut SqliteConnection,
    product_id: &str,
    requested: i64,
) -> EngineResult<CoreError> {
    Ok(match product::stock_of(conn, product_id).await? {
        Some((name, available, true)) => {
            debug!(product_id, available, requested, "Insufficient stock");
            CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                product_name: name,
                available,
                requested,
            }
        }
        // Inactive products are not for sale
        _ => CoreError::ProductNotFound(product_id.to_string()),
    })
}

fn build_items(
    header: &Transaction,
    snapshots: &[&ReservedStock],
    request: &NewTransaction,
    line_totals: &[Money],
) -> Vec<TransactionItem> {
    snapshots
        .iter()
        .zip(&request.items)
        .zip(line_totals)
        .map(|((snapshot, line), total)| TransactionItem {
            id: Uuid::new_v4().to_string(),
            transaction_id: header.id.clone(),
            product_id: snapshot.id.clone(),
            product_name: snapshot.name.clone(),
            quantity: line.quantity,
            unit_price: snapshot.selling_price,
            total_price: *total,
            created_at: header.created_at,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
