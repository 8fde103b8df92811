//! # Stock Service
//!
//! Product catalog and stock mutations. Every stock-changing operation is
//! one local transaction doing three writes together:
//!
//! 1. the product's new stock level,
//! 2. the ledger movement recording the APPLIED delta,
//! 3. the pending queue entry that will replay the delta remotely.
//!
//! A crash can therefore never produce a stock change without its ledger
//! row, or a ledger row that will never reach the remote store.

use serde_json::json;
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use cantina_core::{
    dates, stock_math,
    validation::{validate_product_name, validate_stock_level, validate_unit},
    Movement, MovementKind, Product, QueueAction, SyncTable,
};
use cantina_db::{Database, MovementRepository, NewMovement, PendingOpRepository, ProductRepository};

/// Service for product and stock operations.
#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    /// Creates a new StockService over the local store.
    pub fn new(db: Database) -> Self {
        StockService { db }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Creates a product with stock 0 and queues its remote creation.
    pub async fn create(&self, name: &str, unit: &str) -> ServiceResult<Product> {
        validate_product_name(name)?;
        validate_unit(unit)?;
        let name = name.trim();
        let unit = unit.trim();

        let now = chrono::Utc::now();

        let mut tx = self.db.pool().begin().await.map_err(cantina_db::DbError::from)?;
        let id = ProductRepository::insert_in(&mut tx, name, unit, 0, true, now).await?;
        PendingOpRepository::enqueue_in(
            &mut tx,
            SyncTable::Products,
            QueueAction::Create,
            &json!({ "name": name, "unit": unit }),
        )
        .await?;
        tx.commit().await.map_err(cantina_db::DbError::from)?;

        info!(id = id, name = %name, "Product created");
        self.get(id).await
    }

    /// Updates a product's name and unit. Local-only: edits are not queued,
    /// so a later pull may overwrite them with the remote version.
    pub async fn update(&self, product_id: i64, name: &str, unit: &str) -> ServiceResult<Product> {
        validate_product_name(name)?;
        validate_unit(unit)?;

        self.db.products().update_fields(product_id, name.trim(), unit.trim()).await?;
        self.get(product_id).await
    }

    /// Archives (soft-deletes) a product. Local-only, like `update`.
    pub async fn archive(&self, product_id: i64) -> ServiceResult<()> {
        self.db.products().archive(product_id).await?;
        info!(id = product_id, "Product archived");
        Ok(())
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list_active().await?)
    }

    /// Gets a product or fails with NotFound.
    pub async fn get(&self, product_id: i64) -> ServiceResult<Product> {
        self.db
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Product {product_id}")))
    }

    // =========================================================================
    // Stock Mutations
    // =========================================================================

    /// Adds one unit of stock (a restock).
    pub async fn increment(&self, product_id: i64) -> ServiceResult<Product> {
        let product = self.get(product_id).await?;
        self.apply_delta(&product, product.current_stock + 1, 1, MovementKind::Restock, None)
            .await
    }

    /// Removes one unit of stock (a sale), clamping at 0.
    ///
    /// The ledger records the APPLIED delta: decrementing at stock 0 writes
    /// a quantity-0 sale, so consumption statistics never count phantom
    /// units.
    pub async fn decrement(&self, product_id: i64) -> ServiceResult<Product> {
        let product = self.get(product_id).await?;
        let (new_stock, applied) = stock_math::clamped_decrement(product.current_stock);
        self.apply_delta(&product, new_stock, applied, MovementKind::Sale, None)
            .await
    }

    /// Sets the stock to an exact recounted level, recording the signed
    /// difference as an adjustment.
    pub async fn adjust(
        &self,
        product_id: i64,
        new_stock: i64,
        notes: Option<String>,
    ) -> ServiceResult<Product> {
        validate_stock_level(new_stock)?;

        let product = self.get(product_id).await?;
        let delta = stock_math::adjustment_delta(product.current_stock, new_stock);
        self.apply_delta(&product, new_stock, delta, MovementKind::Adjustment, notes)
            .await
    }

    /// The shared mutation transaction: stock + ledger + queue, atomically.
    async fn apply_delta(
        &self,
        product: &Product,
        new_stock: i64,
        quantity: i64,
        kind: MovementKind,
        notes: Option<String>,
    ) -> ServiceResult<Product> {
        let date = dates::current_date();
        let time = dates::current_time();

        debug!(
            id = product.id,
            from = product.current_stock,
            to = new_stock,
            kind = kind.as_str(),
            "Applying stock mutation"
        );

        let mut tx = self.db.pool().begin().await.map_err(cantina_db::DbError::from)?;

        ProductRepository::set_stock_in(&mut tx, product.id, new_stock).await?;

        MovementRepository::insert_in(
            &mut tx,
            NewMovement {
                product_id: product.id,
                date: date.clone(),
                time: time.clone(),
                quantity,
                kind,
                notes: notes.clone(),
            },
        )
        .await?;

        PendingOpRepository::enqueue_in(
            &mut tx,
            SyncTable::Movements,
            QueueAction::Record,
            &json!({
                "productId": product.id,
                "type": kind.as_str(),
                "quantity": quantity,
                "date": date,
                "time": time,
                "notes": notes,
            }),
        )
        .await?;

        tx.commit().await.map_err(cantina_db::DbError::from)?;

        self.get(product.id).await
    }

    // =========================================================================
    // Ledger Queries
    // =========================================================================

    /// Most recent movements across all products, newest first.
    pub async fn recent_movements(&self, limit: i64) -> ServiceResult<Vec<Movement>> {
        Ok(self.db.movements().recent(limit).await?)
    }

    /// Most recent movements for one product, newest first.
    pub async fn product_movements(&self, product_id: i64, limit: i64) -> ServiceResult<Vec<Movement>> {
        Ok(self.db.movements().for_product(product_id, limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cantina_db::DbConfig;

    async fn service() -> StockService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        StockService::new(db)
    }

    #[tokio::test]
    async fn test_create_validates_and_queues() {
        let svc = service().await;

        let product = svc.create("Orange juice", "bottle").await.unwrap();
        assert_eq!(product.current_stock, 0);
        assert!(product.is_active);

        // One products/create entry queued.
        let ops = svc.db.pending().all().await.unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].target, SyncTable::Products);
        assert_eq!(ops[0].action, QueueAction::Create);

        // Too-short name rejected before any write.
        let err = svc.create("ab", "unit").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.db.pending().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_increment_and_decrement() {
        let svc = service().await;
        let product = svc.create("Bottled water", "bottle").await.unwrap();

        let product = svc.increment(product.id).await.unwrap();
        assert_eq!(product.current_stock, 1);

        let product = svc.decrement(product.id).await.unwrap();
        assert_eq!(product.current_stock, 0);

        let movements = svc.product_movements(product.id, 10).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].quantity, -1); // newest first: the sale
        assert_eq!(movements[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_decrement_at_zero_clamps_and_records_zero() {
        let svc = service().await;
        let product = svc.create("Coffee", "cup").await.unwrap();

        let product = svc.decrement(product.id).await.unwrap();
        assert_eq!(product.current_stock, 0);

        let movements = svc.product_movements(product.id, 1).await.unwrap();
        assert_eq!(movements[0].kind, MovementKind::Sale);
        assert_eq!(movements[0].quantity, 0); // applied delta, not requested
    }

    #[tokio::test]
    async fn test_adjust_records_signed_difference() {
        let svc = service().await;
        let product = svc.create("Ham sandwich", "unit").await.unwrap();
        svc.adjust(product.id, 10, None).await.unwrap();

        let product = svc.adjust(product.id, 15, Some("recount".into())).await.unwrap();
        assert_eq!(product.current_stock, 15);

        let movements = svc.product_movements(product.id, 1).await.unwrap();
        assert_eq!(movements[0].kind, MovementKind::Adjustment);
        assert_eq!(movements[0].quantity, 5);
        assert_eq!(movements[0].notes.as_deref(), Some("recount"));
    }

    #[tokio::test]
    async fn test_adjust_rejects_out_of_range() {
        let svc = service().await;
        let product = svc.create("Coffee", "cup").await.unwrap();

        assert!(svc.adjust(product.id, -1, None).await.is_err());
        assert!(svc.adjust(product.id, 10_000, None).await.is_err());
        // No mutation happened.
        assert_eq!(svc.get(product.id).await.unwrap().current_stock, 0);
    }

    #[tokio::test]
    async fn test_every_mutation_queues_a_movement_op() {
        let svc = service().await;
        let product = svc.create("Coffee", "cup").await.unwrap();

        svc.increment(product.id).await.unwrap();
        svc.decrement(product.id).await.unwrap();
        svc.adjust(product.id, 5, None).await.unwrap();

        let ops = svc.db.pending().all().await.unwrap();
        let movement_ops: Vec<_> = ops
            .iter()
            .filter(|op| op.target == SyncTable::Movements)
            .collect();
        assert_eq!(movement_ops.len(), 3);
        assert!(movement_ops[0].payload.contains("restock"));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let svc = service().await;
        let err = svc.increment(999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
