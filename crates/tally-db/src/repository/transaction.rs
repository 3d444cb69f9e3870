//! # Transaction Repository
//!
//! Read side of sales: filtered listing with pagination, lookup by id or
//! receipt number, and the insert helpers the sale engine runs inside its
//! own database transaction.
//!
//! ## Listing
//! ```text
//! TransactionFilter                      SQL (built with QueryBuilder)
//! ─────────────────                      ─────────────────────────────
//! transaction_number: "0917"      ──►    transaction_number LIKE '%0917%'
//! user_id: "cashier-1"            ──►    user_id = ?
//! status: completed               ──►    status = ?
//! date_from: 2026-10-01 (local)   ──►    created_at >= <local midnight in UTC>
//! date_to:   2026-10-17 (local)   ──►    created_at <  <next local midnight>
//!
//! ORDER BY created_at DESC LIMIT ? OFFSET ?
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::local_day_range;
use tally_core::{Transaction, TransactionDetail, TransactionItem, TransactionStatus};

const TRANSACTION_COLUMNS: &str = r#"
    id, transaction_number, user_id, customer_name, subtotal,
    discount_percentage, discount_amount, tax_percentage, tax_amount,
    total_amount, payment_method, payment_amount, change_amount,
    status, notes, created_at, updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, transaction_id, product_id, product_name, quantity,
    unit_price, total_price, created_at
"#;

// =============================================================================
// Filters & Pagination
// =============================================================================

/// Optional listing filters. All present filters must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Substring of the transaction number.
    #[serde(default)]
    pub transaction_number: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// First local calendar day to include.
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Last local calendar day to include.
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

/// Page request. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Builds a pagination, applying defaults and clamping.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Pagination {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(None, None)
    }
}

/// One page of transactions (headers only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for transaction queries.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Lists transactions matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> DbResult<TransactionPage> {
        debug!(?filter, page = pagination.page, limit = pagination.limit, "Listing transactions");

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM transactions");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT ");
        query.push(TRANSACTION_COLUMNS);
        query.push(" FROM transactions");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(pagination.limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let transactions = query
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;

        let limit = pagination.limit as i64;
        Ok(TransactionPage {
            transactions,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: (total + limit - 1) / limit,
        })
    }

    /// Transaction header by id.
    pub async fn get_header(&self, id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("SELECT {} FROM transactions WHERE id = ?1", TRANSACTION_COLUMNS);
        let transaction = sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    /// Transaction with all of its items, by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransactionDetail>> {
        match self.get_header(id).await? {
            Some(transaction) => self.with_items(transaction).await.map(Some),
            None => Ok(None),
        }
    }

    /// Transaction with all of its items, by receipt number.
    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<TransactionDetail>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE transaction_number = ?1",
            TRANSACTION_COLUMNS
        );
        let transaction = sqlx::query_as::<_, Transaction>(&sql)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;

        match transaction {
            Some(transaction) => self.with_items(transaction).await.map(Some),
            None => Ok(None),
        }
    }

    /// Items of a transaction in insertion order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let mut conn = self.pool.acquire().await?;
        items_of(&mut conn, transaction_id).await
    }

    /// Current status only; used by the engine to plan a transition.
    pub async fn status_of(&self, id: &str) -> DbResult<Option<TransactionStatus>> {
        let status = sqlx::query_scalar::<_, TransactionStatus>(
            "SELECT status FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }

    async fn with_items(&self, transaction: Transaction) -> DbResult<TransactionDetail> {
        let items = self.get_items(&transaction.id).await?;
        Ok(TransactionDetail { transaction, items })
    }
}

fn push_filters<'a>(query: &mut QueryBuilder<'a, Sqlite>, filter: &'a TransactionFilter) {
    let mut sep = " WHERE ";

    if let Some(number) = filter.transaction_number.as_deref().filter(|s| !s.is_empty()) {
        query.push(sep).push("transaction_number LIKE ").push_bind(format!("%{}%", number));
        sep = " AND ";
    }
    if let Some(user_id) = filter.user_id.as_deref() {
        query.push(sep).push("user_id = ").push_bind(user_id);
        sep = " AND ";
    }
    if let Some(status) = filter.status {
        query.push(sep).push("status = ").push_bind(status);
        sep = " AND ";
    }
    if let Some(from) = filter.date_from {
        let (start, _) = local_day_range(from, from);
        query.push(sep).push("created_at >= ").push_bind(start);
        sep = " AND ";
    }
    if let Some(to) = filter.date_to {
        let (_, end) = local_day_range(to, to);
        query.push(sep).push("created_at < ").push_bind(end);
    }
}

// =============================================================================
// Engine Helpers (run on the engine's connection)
// =============================================================================

pub(crate) async fn insert_transaction(
    conn: &mut SqliteConnection,
    t: &Transaction,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, transaction_number, user_id, customer_name, subtotal,
            discount_percentage, discount_amount, tax_percentage, tax_amount,
            total_amount, payment_method, payment_amount, change_amount,
            status, notes, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
    )
    .bind(&t.id)
    .bind(&t.transaction_number)
    .bind(&t.user_id)
    .bind(&t.customer_name)
    .bind(t.subtotal)
    .bind(t.discount_percentage)
    .bind(t.discount_amount)
    .bind(t.tax_percentage)
    .bind(t.tax_amount)
    .bind(t.total_amount)
    .bind(t.payment_method)
    .bind(t.payment_amount)
    .bind(t.change_amount)
    .bind(t.status)
    .bind(&t.notes)
    .bind(t.created_at)
    .bind(t.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &TransactionItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transaction_items (
            id, transaction_id, product_id, product_name, quantity,
            unit_price, total_price, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.transaction_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.total_price)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn items_of(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> DbResult<Vec<TransactionItem>> {
    let sql = format!(
        "SELECT {} FROM transaction_items WHERE transaction_id = ?1 ORDER BY rowid",
        ITEM_COLUMNS
    );
    let items = sqlx::query_as::<_, TransactionItem>(&sql)
        .bind(transaction_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(items)
}

/// Compare-and-swap on the status column. Returns false if the row no
/// longer has status `expected`.
pub(crate) async fn swap_status(
    conn: &mut SqliteConnection,
    id: &str,
    expected: TransactionStatus,
    new: TransactionStatus,
    now: chrono::DateTime<chrono::Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE transactions SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
    )
    .bind(id)
    .bind(expected)
    .bind(new)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}
