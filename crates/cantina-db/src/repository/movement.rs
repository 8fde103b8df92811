//! # Movement (Ledger) Repository
//!
//! Append-only stock ledger. Rows are inserted once and never updated; the
//! same rows serve as the audit trail and as the raw data for consumption
//! statistics.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use cantina_core::{Movement, MovementKind};

/// Fields for a new ledger row. `created_at` is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: i64,
    /// Calendar date key, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock time, `HH:MM:SS`.
    pub time: String,
    /// The APPLIED signed delta (or the stock level, for snapshot kinds).
    pub quantity: i64,
    pub kind: MovementKind,
    pub notes: Option<String>,
}

/// Repository for ledger operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Appends a ledger row inside an ongoing transaction.
    pub async fn insert_in(conn: &mut SqliteConnection, row: NewMovement) -> DbResult<i64> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO movements (product_id, date, time, quantity, kind, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(row.product_id)
        .bind(&row.date)
        .bind(&row.time)
        .bind(row.quantity)
        .bind(row.kind)
        .bind(&row.notes)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent movements, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, product_id, date, time, quantity, kind, notes, created_at
            FROM movements
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Most recent movements for one product, newest first.
    pub async fn for_product(&self, product_id: i64, limit: i64) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, product_id, date, time, quantity, kind, notes, created_at
            FROM movements
            WHERE product_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// All movements on one calendar date.
    pub async fn by_date(&self, date: &str) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, product_id, date, time, quantity, kind, notes, created_at
            FROM movements
            WHERE date = ?1
            ORDER BY id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Sum of sale magnitudes for a product over a date range (inclusive).
    ///
    /// Uses the (product_id, date) compound index. Clamped sales contribute
    /// 0 - the ledger stores applied deltas, so no correction is needed.
    pub async fn consumption_between(
        &self,
        product_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(ABS(quantity)), 0)
            FROM movements
            WHERE product_id = ?1
              AND kind = ?2
              AND date BETWEEN ?3 AND ?4
            "#,
        )
        .bind(product_id)
        .bind(MovementKind::Sale)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Counts ledger rows for a product (diagnostics and tests).
    pub async fn count_for_product(&self, product_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM movements WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
