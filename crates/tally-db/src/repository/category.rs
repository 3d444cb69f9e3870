//! # Category Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use tally_core::Category;

/// Repository for product categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - a category with this name exists
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, is_active, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.is_active)
            .bind(category.created_at)
            .execute(&self.pool)
            .await?;

        Ok(category)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, is_active, created_at FROM categories WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Active categories ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, is_active, created_at FROM categories WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        repo.insert("Minuman").await.unwrap();
        repo.insert("Makanan").await.unwrap();

        let names: Vec<String> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Makanan", "Minuman"]);

        assert!(repo.get_by_name("Minuman").await.unwrap().is_some());
        let err = repo.insert("Minuman").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
