//! # Statistics Service
//!
//! Read-side consumption statistics derived from the sale ledger. The
//! denominator everywhere is *operating days* - calendar days with a closed
//! workday - so days the cafeteria never opened don't dilute the averages.

use serde::Serialize;

use crate::error::ServiceResult;
use cantina_core::{dates, stock_math, DEFAULT_LOOKBACK_DAYS};
use cantina_db::Database;

/// Per-product consumption averages.
#[derive(Debug, Clone, Serialize)]
pub struct ProductStats {
    pub product_id: i64,
    /// Units consumed per operating day (30-day window).
    pub daily: f64,
    /// Projected weekly consumption (28-day window × 7).
    pub weekly: f64,
    /// Projected monthly consumption (90-day window × 30).
    pub monthly: f64,
}

/// One row of the top-sellers ranking.
#[derive(Debug, Clone, Serialize)]
pub struct TopSeller {
    pub product_id: i64,
    pub product_name: String,
    pub total_sales: i64,
}

/// One day of consumption history.
#[derive(Debug, Clone, Serialize)]
pub struct DailyConsumption {
    pub date: String,
    pub consumption: i64,
}

/// Service for consumption statistics.
#[derive(Debug, Clone)]
pub struct StatsService {
    db: Database,
}

impl StatsService {
    /// Creates a new StatsService over the local store.
    pub fn new(db: Database) -> Self {
        StatsService { db }
    }

    /// Total sale consumption for a product over [start, end].
    pub async fn consumption(
        &self,
        product_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> ServiceResult<i64> {
        Ok(self
            .db
            .movements()
            .consumption_between(product_id, start_date, end_date)
            .await?)
    }

    /// Average units consumed per operating day over the last `days` days.
    ///
    /// 0 when there were no operating days in the window, never an error.
    pub async fn daily_average(&self, product_id: i64, days: i64) -> ServiceResult<f64> {
        let end = dates::current_date();
        let start = dates::date_days_ago(days);

        let total = self.consumption(product_id, &start, &end).await?;
        let operating_days = self.db.workdays().count_operating_days(&start, &end).await?;

        Ok(stock_math::daily_average(total, operating_days))
    }

    /// Projected weekly consumption, from a `weeks`-long sample.
    pub async fn weekly_average(&self, product_id: i64, weeks: i64) -> ServiceResult<f64> {
        let daily = self.daily_average(product_id, weeks * 7).await?;
        Ok(daily * 7.0)
    }

    /// Projected monthly consumption, from a `months`-long sample.
    pub async fn monthly_average(&self, product_id: i64, months: i64) -> ServiceResult<f64> {
        let daily = self.daily_average(product_id, months * 30).await?;
        Ok(daily * 30.0)
    }

    /// Daily/weekly/monthly averages for one product, with the original
    /// windows (30 days, 4 weeks, 3 months).
    pub async fn product_stats(&self, product_id: i64) -> ServiceResult<ProductStats> {
        Ok(ProductStats {
            product_id,
            daily: self.daily_average(product_id, DEFAULT_LOOKBACK_DAYS).await?,
            weekly: self.weekly_average(product_id, 4).await?,
            monthly: self.monthly_average(product_id, 3).await?,
        })
    }

    /// Active products ranked by sale consumption over the last `days` days.
    pub async fn top_selling(&self, limit: usize, days: i64) -> ServiceResult<Vec<TopSeller>> {
        let end = dates::current_date();
        let start = dates::date_days_ago(days);

        let mut ranking = Vec::new();
        for product in self.db.products().list_active().await? {
            let total_sales = self.consumption(product.id, &start, &end).await?;
            ranking.push(TopSeller {
                product_id: product.id,
                product_name: product.name,
                total_sales,
            });
        }

        ranking.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
        ranking.truncate(limit);
        Ok(ranking)
    }

    /// Per-day consumption for the last `days` days, oldest first.
    pub async fn daily_consumption_history(
        &self,
        product_id: i64,
        days: i64,
    ) -> ServiceResult<Vec<DailyConsumption>> {
        let mut history = Vec::with_capacity(days as usize);
        for i in (0..days).rev() {
            let date = dates::date_days_ago(i);
            let consumption = self.consumption(product_id, &date, &date).await?;
            history.push(DailyConsumption { date, consumption });
        }
        Ok(history)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cantina_core::{MovementKind, StockSnapshot};
    use cantina_db::{
        DbConfig, MovementRepository, NewMovement, ProductRepository, WorkdayRepository,
    };
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str) -> i64 {
        let mut tx = db.pool().begin().await.unwrap();
        let id = ProductRepository::insert_in(&mut tx, name, "unit", 50, true, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }

    async fn record_sale(db: &Database, product_id: i64, date: &str, quantity: i64) {
        let mut tx = db.pool().begin().await.unwrap();
        MovementRepository::insert_in(
            &mut tx,
            NewMovement {
                product_id,
                date: date.to_string(),
                time: "12:00:00".to_string(),
                quantity: -quantity,
                kind: MovementKind::Sale,
                notes: None,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
    }

    async fn closed_workday(db: &Database, date: &str) {
        let snapshot = StockSnapshot::new();
        let mut tx = db.pool().begin().await.unwrap();
        let id = WorkdayRepository::insert_open_in(&mut tx, date, &snapshot, Utc::now(), "Ana")
            .await
            .unwrap();
        WorkdayRepository::close_in(&mut tx, id, &snapshot, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_daily_average_uses_operating_days() {
        let db = test_db().await;
        let stats = StatsService::new(db.clone());
        let pid = seed_product(&db, "Coffee").await;

        // 6 units sold across 2 operating days inside the window.
        let d1 = dates::date_days_ago(2);
        let d2 = dates::date_days_ago(1);
        record_sale(&db, pid, &d1, 4).await;
        record_sale(&db, pid, &d2, 2).await;
        closed_workday(&db, &d1).await;
        closed_workday(&db, &d2).await;

        let avg = stats.daily_average(pid, 30).await.unwrap();
        assert!((avg - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_daily_average_zero_operating_days() {
        let db = test_db().await;
        let stats = StatsService::new(db.clone());
        let pid = seed_product(&db, "Coffee").await;

        // Sales but no closed workday: must be 0, not a division error.
        record_sale(&db, pid, &dates::date_days_ago(1), 5).await;

        let avg = stats.daily_average(pid, 30).await.unwrap();
        assert_eq!(avg, 0.0);
    }

    #[tokio::test]
    async fn test_top_selling_ranks_and_truncates() {
        let db = test_db().await;
        let stats = StatsService::new(db.clone());

        let juice = seed_product(&db, "Orange juice").await;
        let cookie = seed_product(&db, "Chocolate cookie").await;
        let water = seed_product(&db, "Bottled water").await;

        let yesterday = dates::date_days_ago(1);
        record_sale(&db, cookie, &yesterday, 9).await;
        record_sale(&db, juice, &yesterday, 4).await;
        record_sale(&db, water, &yesterday, 1).await;

        let top = stats.top_selling(2, 30).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_name, "Chocolate cookie");
        assert_eq!(top[0].total_sales, 9);
        assert_eq!(top[1].product_name, "Orange juice");
    }

    #[tokio::test]
    async fn test_history_is_oldest_first() {
        let db = test_db().await;
        let stats = StatsService::new(db.clone());
        let pid = seed_product(&db, "Coffee").await;

        record_sale(&db, pid, &dates::date_days_ago(0), 2).await;
        record_sale(&db, pid, &dates::date_days_ago(2), 5).await;

        let history = stats.daily_consumption_history(pid, 3).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].consumption, 5); // two days ago
        assert_eq!(history[1].consumption, 0);
        assert_eq!(history[2].consumption, 2); // today
    }
}
