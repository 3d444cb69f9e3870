//! # Report Repository
//!
//! Dashboard aggregates. Only `completed` sales count as revenue; pending
//! and cancelled transactions are excluded. Windows are local calendar
//! periods converted to UTC bounds on `created_at`.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::local_day_range;
use tally_core::{Money, Product, TransactionStatus};

use super::product::ProductRepository;

/// Today's completed sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Money,
    pub total_transactions: i64,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Completed sales for the current local calendar day.
    pub async fn today_sales_summary(&self) -> DbResult<SalesSummary> {
        let today = Local::now().date_naive();
        self.sales_summary(today, today).await
    }

    /// Completed sales for the local calendar days `from..=to`.
    pub async fn sales_summary(&self, from: NaiveDate, to: NaiveDate) -> DbResult<SalesSummary> {
        let (start, end) = local_day_range(from, to);

        let (total_sales, total_transactions): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM transactions
            WHERE status = ?1 AND created_at >= ?2 AND created_at < ?3
            "#,
        )
        .bind(TransactionStatus::Completed)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        debug!(%from, %to, total_sales, total_transactions, "Sales summary");

        Ok(SalesSummary {
            total_sales: Money::from_cents(total_sales),
            total_transactions,
        })
    }

    /// Completed revenue for the current local calendar month.
    pub async fn monthly_revenue(&self) -> DbResult<Money> {
        let today = Local::now().date_naive();
        let first = today.with_day(1).unwrap_or(today);
        let last = last_day_of_month(first);
        Ok(self.sales_summary(first, last).await?.total_sales)
    }

    /// Active products at or below their restock threshold.
    pub async fn low_stock_products(&self, limit: u32) -> DbResult<Vec<Product>> {
        ProductRepository::new(self.pool.clone()).low_stock(limit).await
    }
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use tally_core::{CartLine, NewTransaction, PaymentMethod, Percentage};

    fn sale(product_id: &str, qty: i64) -> NewTransaction {
        NewTransaction {
            customer_name: None,
            items: vec![CartLine {
                product_id: product_id.to_string(),
                quantity: qty,
            }],
            discount_percentage: Percentage::zero(),
            payment_method: PaymentMethod::Cash,
            payment_amount: Money::from_cents(100_000),
            notes: None,
        }
    }

    #[test]
    fn test_last_day_of_month() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(last_day_of_month(d(2026, 2, 1)), d(2026, 2, 28));
        assert_eq!(last_day_of_month(d(2028, 2, 1)), d(2028, 2, 29));
        assert_eq!(last_day_of_month(d(2026, 12, 1)), d(2026, 12, 31));
    }

    #[tokio::test]
    async fn test_only_completed_sales_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .insert(NewProduct::new("A", "A", Money::from_cents(1500), 100))
            .await
            .unwrap();
        let engine = db.engine();

        engine.create_transaction(&sale(&p.id, 2), "c").await.unwrap(); // 30.00
        let cancelled = engine.create_transaction(&sale(&p.id, 1), "c").await.unwrap();
        let pending = engine.create_transaction(&sale(&p.id, 3), "c").await.unwrap();
        engine
            .update_transaction_status(&cancelled.transaction.id, TransactionStatus::Cancelled)
            .await
            .unwrap();
        engine
            .update_transaction_status(&pending.transaction.id, TransactionStatus::Pending)
            .await
            .unwrap();

        let reports = db.reports();
        let summary = reports.today_sales_summary().await.unwrap();
        assert_eq!(summary.total_transactions, 1);
        assert_eq!(summary.total_sales, Money::from_cents(3000));
        assert_eq!(reports.monthly_revenue().await.unwrap(), Money::from_cents(3000));
    }

    #[tokio::test]
    async fn test_sales_outside_window_are_excluded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .insert(NewProduct::new("A", "A", Money::from_cents(1000), 100))
            .await
            .unwrap();
        let sold = db.engine().create_transaction(&sale(&p.id, 1), "c").await.unwrap();

        // Backdate the sale by 40 days: out of today and this month
        sqlx::query("UPDATE transactions SET created_at = ?1 WHERE id = ?2")
            .bind(Utc::now() - Duration::days(40))
            .bind(&sold.transaction.id)
            .execute(db.pool())
            .await
            .unwrap();

        let reports = db.reports();
        let summary = reports.today_sales_summary().await.unwrap();
        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.total_sales, Money::zero());
        assert_eq!(reports.monthly_revenue().await.unwrap(), Money::zero());
    }
}
