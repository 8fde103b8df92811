//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Identity Note
//! Local ids are rowid surrogates. The sync pull path matches remote rows
//! against local rows **by name** ([`ProductRepository::get_by_name`]);
//! local and remote ids are never compared.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use cantina_core::Product;

/// Repository for product operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active (non-archived) products, sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, unit, current_stock, is_active, created_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists all products including archived ones.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, unit, current_stock, is_active, created_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its local id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, unit, current_stock, is_active, created_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by name (the cross-store match key).
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, unit, current_stock, is_active, created_at
            FROM products
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product inside an ongoing transaction.
    ///
    /// Returns the generated local id.
    pub async fn insert_in(
        conn: &mut SqliteConnection,
        name: &str,
        unit: &str,
        current_stock: i64,
        is_active: bool,
        created_at: DateTime<Utc>,
    ) -> DbResult<i64> {
        debug!(name = %name, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, unit, current_stock, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(name)
        .bind(unit)
        .bind(current_stock)
        .bind(is_active)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Sets a product's stock level inside an ongoing transaction.
    ///
    /// Callers compute the clamped level; this never writes a negative value
    /// (the schema CHECK would reject it anyway).
    pub async fn set_stock_in(
        conn: &mut SqliteConnection,
        id: i64,
        current_stock: i64,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET current_stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(current_stock)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Updates a product's editable fields (name, unit).
    pub async fn update_fields(&self, id: i64, name: &str, unit: &str) -> DbResult<()> {
        debug!(id = id, "Updating product fields");

        let result = sqlx::query("UPDATE products SET name = ?2, unit = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(unit)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product. Ledger history stays intact and the row can
    /// be restored by a later pull.
    pub async fn archive(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Archiving product");

        let result = sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Overwrites a local row with authoritative remote state inside an
    /// ongoing pull transaction (last-writer-wins merge).
    pub async fn apply_remote_in(
        conn: &mut SqliteConnection,
        id: i64,
        current_stock: i64,
        unit: &str,
        is_active: bool,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = ?2, unit = ?3, is_active = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(current_stock)
        .bind(unit)
        .bind(is_active)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn insert(db: &Database, name: &str) -> i64 {
        let mut tx = db.pool().begin().await.unwrap();
        let id = ProductRepository::insert_in(&mut tx, name, "unit", 0, true, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let id = insert(&db, "Orange juice").await;

        let product = db.products().get(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Orange juice");
        assert_eq!(product.current_stock, 0);
        assert!(product.is_active);
    }

    #[tokio::test]
    async fn test_get_by_name() {
        let db = test_db().await;
        insert(&db, "Chocolate cookie").await;

        let found = db.products().get_by_name("Chocolate cookie").await.unwrap();
        assert!(found.is_some());
        let missing = db.products().get_by_name("Vanilla cookie").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        insert(&db, "Bottled coffee").await;

        let mut tx = db.pool().begin().await.unwrap();
        let err =
            ProductRepository::insert_in(&mut tx, "Bottled coffee", "unit", 0, true, Utc::now())
                .await
                .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_archive_hides_from_active_list() {
        let db = test_db().await;
        let id = insert(&db, "Orange juice").await;
        insert(&db, "Bottled coffee").await;

        db.products().archive(id).await.unwrap();

        let active = db.products().list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Bottled coffee");

        let all = db.products().list_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_set_stock() {
        let db = test_db().await;
        let id = insert(&db, "Orange juice").await;

        let mut tx = db.pool().begin().await.unwrap();
        ProductRepository::set_stock_in(&mut tx, id, 12).await.unwrap();
        tx.commit().await.unwrap();

        let product = db.products().get(id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 12);
    }

    #[tokio::test]
    async fn test_not_found_errors() {
        let db = test_db().await;
        let err = db.products().archive(999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
