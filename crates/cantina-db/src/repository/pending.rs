//! # Pending-Operations Queue Repository
//!
//! Durable outbox for local mutations awaiting remote confirmation. Entries
//! are enqueued in the SAME transaction as the local write they describe, so
//! a crash can never produce a local change with no queue entry (or the
//! reverse).
//!
//! Deletion happens only on remote confirmation or on the two terminal
//! failures the push engine recognizes; everything else stays queued.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use cantina_core::{PendingOp, QueueAction, SyncTable};

/// Repository for the durable sync queue.
#[derive(Debug, Clone)]
pub struct PendingOpRepository {
    pool: SqlitePool,
}

impl PendingOpRepository {
    /// Creates a new PendingOpRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PendingOpRepository { pool }
    }

    /// Enqueues an operation inside an ongoing transaction.
    ///
    /// The payload is stored verbatim and POSTed as-is during push.
    pub async fn enqueue_in(
        conn: &mut SqliteConnection,
        target: SyncTable,
        action: QueueAction,
        payload: &serde_json::Value,
    ) -> DbResult<i64> {
        let body = serde_json::to_string(payload)?;

        let result = sqlx::query(
            r#"
            INSERT INTO pending_ops (target, action, payload, attempts, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            "#,
        )
        .bind(target)
        .bind(action)
        .bind(body)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All queued operations in insertion order. The push engine re-sorts by
    /// table precedence before sending; within one table, insertion order is
    /// chronological order.
    pub async fn all(&self) -> DbResult<Vec<PendingOp>> {
        let ops = sqlx::query_as::<_, PendingOp>(
            r#"
            SELECT id, target, action, payload, attempts, last_error, created_at
            FROM pending_ops
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ops)
    }

    /// Removes a confirmed (or terminally failed) entry.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM pending_ops WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Pending operation", id));
        }

        Ok(())
    }

    /// Records a failed push attempt: bumps the counter and keeps the entry
    /// for retry.
    pub async fn record_failure(&self, id: i64, error: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE pending_ops SET attempts = attempts + 1, last_error = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Pending operation", id));
        }

        Ok(())
    }

    /// Counts queued workday-open operations. Guards the pull path's
    /// force-close: a remote "no open workday" is not authoritative while a
    /// local open is still waiting to be pushed.
    pub async fn count_open_workday_ops(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pending_ops WHERE target = ?1 AND action = ?2",
        )
        .bind(SyncTable::Workdays)
        .bind(QueueAction::Open)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Total queued operations (UI badge, diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_ops")
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
    use serde_json::json;

    async fn enqueue(db: &Database, target: SyncTable, action: QueueAction) -> i64 {
        let mut tx = db.pool().begin().await.unwrap();
        let id = PendingOpRepository::enqueue_in(&mut tx, target, action, &json!({"x": 1}))
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_enqueue_preserves_insertion_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        enqueue(&db, SyncTable::Movements, QueueAction::Record).await;
        enqueue(&db, SyncTable::Products, QueueAction::Create).await;
        enqueue(&db, SyncTable::Movements, QueueAction::Record).await;

        let ops = db.pending().all().await.unwrap();
        assert_eq!(ops.len(), 3);
        assert!(ops[0].id < ops[1].id && ops[1].id < ops[2].id);
        assert_eq!(ops[0].payload, r#"{"x":1}"#);
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let id = enqueue(&db, SyncTable::Products, QueueAction::Create).await;
        assert_eq!(db.pending().count().await.unwrap(), 1);

        db.pending().delete(id).await.unwrap();
        assert_eq!(db.pending().count().await.unwrap(), 0);

        let err = db.pending().delete(id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_record_failure_bumps_attempts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = enqueue(&db, SyncTable::Movements, QueueAction::Record).await;

        db.pending().record_failure(id, "connection refused").await.unwrap();
        db.pending().record_failure(id, "HTTP 500").await.unwrap();

        let ops = db.pending().all().await.unwrap();
        assert_eq!(ops[0].attempts, 2);
        assert_eq!(ops[0].last_error.as_deref(), Some("HTTP 500"));
    }

    #[tokio::test]
    async fn test_count_open_workday_ops() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        enqueue(&db, SyncTable::Workdays, QueueAction::Close).await;
        enqueue(&db, SyncTable::Movements, QueueAction::Record).await;
        assert_eq!(db.pending().count_open_workday_ops().await.unwrap(), 0);

        enqueue(&db, SyncTable::Workdays, QueueAction::Open).await;
        assert_eq!(db.pending().count_open_workday_ops().await.unwrap(), 1);
    }
}
