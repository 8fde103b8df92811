//! # Alert Service
//!
//! Low-stock detection built on the consumption statistics: the recommended
//! minimum for a product is what it consumes across a week's active days
//! plus a safety margin, and anything below that is flagged.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::ServiceResult;
use crate::stats::StatsService;
use cantina_core::{
    stock_math, MinimumStock, Product, StockLevel, DEFAULT_ACTIVE_DAYS_PER_WEEK,
    DEFAULT_LOOKBACK_DAYS, DEFAULT_SAFETY_MARGIN_PERCENT,
};
use cantina_db::Database;

/// A product flagged as below its recommended minimum.
#[derive(Debug, Clone, Serialize)]
pub struct LowStockProduct {
    pub product: Product,
    pub minimum_stock: i64,
    pub daily_average: f64,
    /// Units missing to reach the minimum.
    pub deficit: i64,
}

/// Service for low-stock alerts.
#[derive(Debug, Clone)]
pub struct AlertService {
    db: Database,
    stats: StatsService,
}

impl AlertService {
    /// Creates a new AlertService over the local store.
    pub fn new(db: Database) -> Self {
        let stats = StatsService::new(db.clone());
        AlertService { db, stats }
    }

    /// Reads the two tuning settings, falling back to the defaults when a
    /// key is missing or holds a non-numeric value.
    async fn tuning(&self) -> ServiceResult<(i64, i64)> {
        let active_days = self
            .db
            .settings()
            .get("activeDaysPerWeek")
            .await?
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_ACTIVE_DAYS_PER_WEEK);

        let margin = self
            .db
            .settings()
            .get("safetyMarginPercent")
            .await?
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_SAFETY_MARGIN_PERCENT);

        Ok((active_days, margin))
    }

    /// Recommended minimum stock for a product, with the full breakdown.
    pub async fn minimum_stock(&self, product_id: i64) -> ServiceResult<MinimumStock> {
        let (active_days, margin) = self.tuning().await?;
        let daily = self
            .stats
            .daily_average(product_id, DEFAULT_LOOKBACK_DAYS)
            .await?;

        Ok(stock_math::recommended_minimum(daily, active_days, margin))
    }

    /// Classifies a product's current stock as low / medium / good.
    pub async fn stock_level(&self, product_id: i64) -> ServiceResult<StockLevel> {
        let product = self
            .db
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| crate::error::ServiceError::not_found(format!("Product {product_id}")))?;

        let minimum = self.minimum_stock(product_id).await?;
        Ok(stock_math::classify(product.current_stock, minimum.minimum))
    }

    /// True when the product is below its recommended minimum.
    pub async fn is_low_stock(&self, product_id: i64) -> ServiceResult<bool> {
        Ok(self.stock_level(product_id).await? == StockLevel::Low)
    }

    /// All active products currently below their recommended minimum.
    pub async fn low_stock_products(&self) -> ServiceResult<Vec<LowStockProduct>> {
        let mut flagged = Vec::new();

        for product in self.db.products().list_active().await? {
            let minimum = self.minimum_stock(product.id).await?;
            if product.current_stock < minimum.minimum {
                flagged.push(LowStockProduct {
                    deficit: minimum.minimum - product.current_stock,
                    minimum_stock: minimum.minimum,
                    daily_average: minimum.daily_average,
                    product,
                });
            }
        }

        Ok(flagged)
    }

    /// Runs the low-stock check and records the result under the
    /// `lastLowStockAlert` setting for the UI to surface.
    pub async fn check_and_record_low_stock(&self) -> ServiceResult<Vec<LowStockProduct>> {
        let flagged = self.low_stock_products().await?;

        if !flagged.is_empty() {
            info!(count = flagged.len(), "Low stock detected");

            let alert = json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "products": flagged.iter().map(|p| json!({
                    "id": p.product.id,
                    "name": p.product.name,
                    "currentStock": p.product.current_stock,
                    "minimumStock": p.minimum_stock,
                })).collect::<Vec<_>>(),
            });

            self.db.settings().set("lastLowStockAlert", &alert).await?;
        }

        Ok(flagged)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
