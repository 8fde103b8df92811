//! # Workday Repository
//!
//! Shift session storage. The single-open invariant is enforced by the
//! domain layer (local check) and by the remote source of truth
//! (check-then-insert); this repository provides the queries both rely on.
//!
//! ## Ordering Note
//! "Most recent workday" queries order by creation id, never by the date
//! string: backdated and same-day repeated entries would make date ordering
//! ambiguous.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use cantina_core::{StockSnapshot, Workday, WorkdayStatus};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw row shape: snapshot columns are JSON text.
#[derive(sqlx::FromRow)]
struct WorkdayRow {
    id: i64,
    date: String,
    status: WorkdayStatus,
    opening_stock: String,
    closing_stock: Option<String>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    responsible_person: String,
}

impl WorkdayRow {
    fn into_workday(self) -> DbResult<Workday> {
        let opening_stock: StockSnapshot = serde_json::from_str(&self.opening_stock)?;
        let closing_stock: Option<StockSnapshot> = match self.closing_stock {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(Workday {
            id: self.id,
            date: self.date,
            status: self.status,
            opening_stock,
            closing_stock,
            opened_at: self.opened_at,
            closed_at: self.closed_at,
            responsible_person: self.responsible_person,
        })
    }
}

const COLUMNS: &str =
    "id, date, status, opening_stock, closing_stock, opened_at, closed_at, responsible_person";

// =============================================================================
// Repository
// =============================================================================

/// Repository for workday operations.
#[derive(Debug, Clone)]
pub struct WorkdayRepository {
    pool: SqlitePool,
}

impl WorkdayRepository {
    /// Creates a new WorkdayRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkdayRepository { pool }
    }

    /// The currently open workday, if any. At most one row can match.
    pub async fn current_open(&self) -> DbResult<Option<Workday>> {
        let row = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays WHERE status = ?1 LIMIT 1"
        ))
        .bind(WorkdayStatus::Open)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WorkdayRow::into_workday).transpose()
    }

    /// Gets a workday by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Workday>> {
        let row = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WorkdayRow::into_workday).transpose()
    }

    /// Inserts a new OPEN workday inside an ongoing transaction.
    pub async fn insert_open_in(
        conn: &mut SqliteConnection,
        date: &str,
        opening_stock: &StockSnapshot,
        opened_at: DateTime<Utc>,
        responsible_person: &str,
    ) -> DbResult<i64> {
        let snapshot_json = serde_json::to_string(opening_stock)?;

        let result = sqlx::query(
            r#"
            INSERT INTO workdays (date, status, opening_stock, opened_at, responsible_person)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(date)
        .bind(WorkdayStatus::Open)
        .bind(snapshot_json)
        .bind(opened_at)
        .bind(responsible_person)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Transitions a workday to CLOSED with its closing snapshot, inside an
    /// ongoing transaction. The transition is one-way; already-closed rows
    /// are not matched.
    pub async fn close_in(
        conn: &mut SqliteConnection,
        id: i64,
        closing_stock: &StockSnapshot,
        closed_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let snapshot_json = serde_json::to_string(closing_stock)?;

        let result = sqlx::query(
            r#"
            UPDATE workdays
            SET status = ?2, closing_stock = ?3, closed_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(id)
        .bind(WorkdayStatus::Closed)
        .bind(snapshot_json)
        .bind(closed_at)
        .bind(WorkdayStatus::Open)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open workday", id));
        }

        Ok(())
    }

    /// Closes a workday WITHOUT a closing snapshot - mirrors a close that
    /// happened remotely (the remote row holds the authoritative snapshot).
    pub async fn mark_closed(&self, id: i64, closed_at: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE workdays
            SET status = ?2, closed_at = ?3
            WHERE id = ?1 AND status = ?4
            "#,
        )
        .bind(id)
        .bind(WorkdayStatus::Closed)
        .bind(closed_at)
        .bind(WorkdayStatus::Open)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open workday", id));
        }

        Ok(())
    }

    /// The most recently created CLOSED workday (by id, not date).
    pub async fn last_closed(&self) -> DbResult<Option<Workday>> {
        let row = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays WHERE status = ?1 ORDER BY id DESC LIMIT 1"
        ))
        .bind(WorkdayStatus::Closed)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WorkdayRow::into_workday).transpose()
    }

    /// Workdays whose date falls in [start, end], any status.
    pub async fn in_range(&self, start_date: &str, end_date: &str) -> DbResult<Vec<Workday>> {
        let rows = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays WHERE date BETWEEN ?1 AND ?2 ORDER BY id"
        ))
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WorkdayRow::into_workday).collect()
    }

    /// Closed workdays whose date falls in [start, end].
    pub async fn closed_in_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> DbResult<Vec<Workday>> {
        let rows = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays WHERE date BETWEEN ?1 AND ?2 AND status = ?3 ORDER BY id"
        ))
        .bind(start_date)
        .bind(end_date)
        .bind(WorkdayStatus::Closed)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WorkdayRow::into_workday).collect()
    }

    /// Number of operating days in [start, end]: calendar days with a
    /// CLOSED workday. The denominator for consumption-rate statistics.
    pub async fn count_operating_days(&self, start_date: &str, end_date: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workdays WHERE date BETWEEN ?1 AND ?2 AND status = ?3",
        )
        .bind(start_date)
        .bind(end_date)
        .bind(WorkdayStatus::Closed)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Most recent workdays, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<Workday>> {
        let rows = sqlx::query_as::<_, WorkdayRow>(&format!(
            "SELECT {COLUMNS} FROM workdays ORDER BY id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WorkdayRow::into_workday).collect()
    }

    /// Counts OPEN workdays. The local invariant check: must be 0 or 1.
    pub async fn count_open(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workdays WHERE status = ?1")
            .bind(WorkdayStatus::Open)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
