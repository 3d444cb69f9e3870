//! # Product Repository
//!
//! The catalog store: products, their prices and stock counters.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, check in Rust, write absolute value               │
//! │     SELECT stock → 5;  5 >= 3 ✓;  UPDATE SET stock = 2             │
//! │     (two sales can both read 5 and both "pass")                    │
//! │                                                                     │
//! │  ✅ CORRECT: guarded delta (compare-and-swap in one statement)     │
//! │     UPDATE products SET stock = stock - 3                          │
//! │     WHERE id = ? AND stock >= 3                                    │
//! │     0 rows → not found or not enough stock                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `decrement_stock` and `increment_stock` take a connection rather than the
//! pool so the sale engine can run them inside its own database transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{Money, Product};

const PRODUCT_COLUMNS: &str = r#"
    id, category_id, sku, name, selling_price, stock_quantity,
    min_stock, is_active, created_at, updated_at
"#;

/// Fields needed to add a product to the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<String>,
    pub sku: String,
    pub name: String,
    pub selling_price: Money,
    pub stock_quantity: i64,
    pub min_stock: i64,
}

impl NewProduct {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        NewProduct {
            category_id: None,
            sku: sku.into(),
            name: name.into(),
            selling_price: price,
            stock_quantity: stock,
            min_stock: 0,
        }
    }
}

/// Snapshot returned by a successful stock decrement.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservedStock {
    pub id: String,
    pub name: String,
    pub selling_price: Money,
    pub stock_quantity: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE sku = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Active products at or below their restock threshold, lowest stock first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {} FROM products
            WHERE is_active = 1 AND stock_quantity <= min_stock
            ORDER BY stock_quantity ASC, name ASC
            LIMIT ?1
            "#,
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Low stock products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::CheckViolation)` - non-positive price or negative stock
    pub async fn insert(&self, new: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            category_id: new.category_id,
            sku: new.sku,
            name: new.name,
            selling_price: new.selling_price,
            stock_quantity: new.stock_quantity,
            min_stock: new.min_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category_id, sku, name, selling_price, stock_quantity,
                min_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.selling_price)
        .bind(product.stock_quantity)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates catalog fields (name, price, thresholds, category).
    ///
    /// Stock is deliberately not written here; it only moves through
    /// the guarded delta functions below.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?2,
                sku = ?3,
                name = ?4,
                selling_price = ?5,
                min_stock = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.selling_price)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical transaction items still reference it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adds received goods to stock (outside any sale).
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        increment_stock(&mut conn, id, quantity, Utc::now()).await
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Takes `quantity` units of an active product if, and only if, enough are
/// on hand. Returns the post-decrement snapshot, or `None` when the product
/// is missing, inactive, or short.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<ReservedStock>> {
    let reserved = sqlx::query_as::<_, ReservedStock>(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND is_active = 1 AND stock_quantity >= ?2
        RETURNING id, name, selling_price, stock_quantity
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(reserved)
}

/// Returns `quantity` units to a product's stock. Inactive products are
/// restored too; only a missing row is an error.
pub async fn increment_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE products SET stock_quantity = stock_quantity + ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

/// Reads the current stock and active flag inside an open transaction.
pub(crate) async fn stock_of(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<(String, i64, bool)>> {
    let row = sqlx::query_as::<_, (String, i64, bool)>(
        "SELECT name, stock_quantity, is_active FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let repo = db.products();
        let created = repo
            .insert(NewProduct::new("KOPI-01", "Kopi Susu", Money::from_cents(1500), 10))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Kopi Susu");
        assert_eq!(fetched.selling_price, Money::from_cents(1500));
        assert_eq!(fetched.stock_quantity, 10);

        let by_sku = repo.get_by_sku("KOPI-01").await.unwrap().unwrap();
        assert_eq!(by_sku.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = db().await;
        let repo = db.products();
        repo.insert(NewProduct::new("A", "A", Money::from_cents(100), 1))
            .await
            .unwrap();
        let err = repo
            .insert(NewProduct::new("A", "A again", Money::from_cents(100), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let db = db().await;
        let err = db
            .products()
            .insert(NewProduct::new("NEG", "Neg", Money::from_cents(100), -1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let db = db().await;
        let p = db
            .products()
            .insert(NewProduct::new("TEH", "Teh Manis", Money::from_cents(800), 3))
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let reserved = decrement_stock(&mut conn, &p.id, 2, Utc::now()).await.unwrap().unwrap();
        assert_eq!(reserved.stock_quantity, 1);
        assert_eq!(reserved.name, "Teh Manis");

        // Only one left: asking for two matches nothing and changes nothing
        assert!(decrement_stock(&mut conn, &p.id, 2, Utc::now()).await.unwrap().is_none());
        assert!(decrement_stock(&mut conn, "missing", 1, Utc::now()).await.unwrap().is_none());
        drop(conn);

        assert_eq!(db.products().get_by_id(&p.id).await.unwrap().unwrap().stock_quantity, 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_product_cannot_be_decremented_but_can_be_restored() {
        let db = db().await;
        let p = db
            .products()
            .insert(NewProduct::new("OLD", "Old", Money::from_cents(100), 5))
            .await
            .unwrap();
        db.products().soft_delete(&p.id).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(decrement_stock(&mut conn, &p.id, 1, Utc::now()).await.unwrap().is_none());
        increment_stock(&mut conn, &p.id, 2, Utc::now()).await.unwrap();
        drop(conn);

        assert_eq!(db.products().get_by_id(&p.id).await.unwrap().unwrap().stock_quantity, 7);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = db().await;
        let repo = db.products();
        let mut low = NewProduct::new("LOW", "Low", Money::from_cents(100), 2);
        low.min_stock = 5;
        repo.insert(low).await.unwrap();
        repo.insert(NewProduct::new("OK", "Ok", Money::from_cents(100), 50))
            .await
            .unwrap();

        let result = repo.low_stock(10).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sku, "LOW");
    }
}
