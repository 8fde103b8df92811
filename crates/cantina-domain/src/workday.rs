//! # Workday Service
//!
//! The open/close state machine and the system-wide single-open-workday
//! invariant.
//!
//! ## Opening, Step by Step
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Local check      any local open workday?          → Conflict       │
//! │  2. Remote check     GET /workdays?status=open                          │
//! │       remote open                                      → Conflict       │
//! │       transport error (unreachable)                    → offline mode   │
//! │       server error (5xx: remote state unknown)         → BLOCK          │
//! │  3. Online confirm   POST /workdays action=open                         │
//! │       201 → confirmed, nothing queued                                   │
//! │       409 → Conflict                                                     │
//! │       transport error mid-flight → fall back to offline mode            │
//! │  4. Local effect     one transaction: workday row + opening snapshot    │
//! │                      movements (+ queue entry only in offline mode)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transport/server distinction in step 2 is deliberate: an unreachable
//! remote cannot have an open workday this client doesn't know about being
//! *created by this request*, so degrading offline is safe. A 5xx means the
//! remote saw the request and its state is unknown - opening anyway could
//! break the invariant.

use serde_json::json;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use cantina_core::{
    dates, MovementKind, QueueAction, StockSnapshot, SyncTable, ValidationError, Workday,
};
use cantina_db::{
    Database, MovementRepository, NewMovement, PendingOpRepository, WorkdayRepository,
};
use cantina_remote::{RemoteClient, RemoteError};

/// Outcome of the remote half of the open handshake.
enum RemoteOpen {
    /// The remote accepted the open; nothing to queue.
    Confirmed,
    /// The remote was unreachable; the open must be queued for replay.
    Offline,
}

/// Service for workday lifecycle operations.
#[derive(Debug, Clone)]
pub struct WorkdayService {
    db: Database,
    remote: RemoteClient,
}

impl WorkdayService {
    /// Creates a new WorkdayService.
    pub fn new(db: Database, remote: RemoteClient) -> Self {
        WorkdayService { db, remote }
    }

    // =========================================================================
    // Open
    // =========================================================================

    /// Opens a workday for `responsible_person`, enforcing the single-open
    /// invariant locally and remotely.
    pub async fn open(&self, responsible_person: &str) -> ServiceResult<Workday> {
        let responsible_person = responsible_person.trim();
        if responsible_person.is_empty() {
            return Err(ValidationError::Required {
                field: "responsiblePerson".to_string(),
            }
            .into());
        }

        // Step 1: local invariant.
        if let Some(open) = self.db.workdays().current_open().await? {
            return Err(ServiceError::Conflict {
                responsible: Some(open.responsible_person),
            });
        }

        // Step 2: remote invariant, when reachable.
        let mut mode = match self.remote.fetch_open_workday().await {
            Ok(Some(remote_open)) => {
                return Err(ServiceError::Conflict {
                    responsible: Some(remote_open.responsible_person),
                });
            }
            Ok(None) => RemoteOpen::Confirmed, // provisionally; step 3 decides
            Err(err) if err.is_transport() => {
                warn!("Remote unreachable during open check; opening in offline mode");
                RemoteOpen::Offline
            }
            Err(err) => return Err(err.into()),
        };

        let date = dates::current_date();
        let products = self.db.products().list_active().await?;
        let opening_stock: StockSnapshot =
            products.iter().map(|p| (p.id, p.current_stock)).collect();

        // Step 3: synchronous confirmation while online.
        if matches!(mode, RemoteOpen::Confirmed) {
            match self
                .remote
                .open_workday(&date, &opening_stock, responsible_person)
                .await
            {
                Ok(_) => {}
                Err(RemoteError::Conflict { responsible }) => {
                    return Err(ServiceError::Conflict { responsible });
                }
                Err(err) if err.is_transport() => {
                    warn!("Remote dropped mid-open; falling back to offline mode");
                    mode = RemoteOpen::Offline;
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Step 4: local effect, atomically.
        let now = chrono::Utc::now();
        let time = dates::current_time();

        let mut tx = self.db.pool().begin().await.map_err(cantina_db::DbError::from)?;

        let id = WorkdayRepository::insert_open_in(
            &mut tx,
            &date,
            &opening_stock,
            now,
            responsible_person,
        )
        .await?;

        // Informational snapshot rows: quantity records the stock LEVEL at
        // open time. Never queued - /movements mutates remote stock.
        for product in &products {
            MovementRepository::insert_in(
                &mut tx,
                NewMovement {
                    product_id: product.id,
                    date: date.clone(),
                    time: time.clone(),
                    quantity: product.current_stock,
                    kind: MovementKind::Opening,
                    notes: None,
                },
            )
            .await?;
        }

        if matches!(mode, RemoteOpen::Offline) {
            PendingOpRepository::enqueue_in(
                &mut tx,
                SyncTable::Workdays,
                QueueAction::Open,
                &json!({
                    "action": "open",
                    "date": date,
                    "openingStock": opening_stock,
                    "responsiblePerson": responsible_person,
                }),
            )
            .await?;
        }

        tx.commit().await.map_err(cantina_db::DbError::from)?;

        info!(
            id = id,
            responsible = %responsible_person,
            offline = matches!(mode, RemoteOpen::Offline),
            "Workday opened"
        );

        self.get(id).await
    }

    // =========================================================================
    // Close
    // =========================================================================

    /// Closes the open workday, snapshotting final stock levels.
    ///
    /// The close is always queued: the remote may have force-closed already,
    /// in which case the push engine treats the 404 as success.
    pub async fn close(&self) -> ServiceResult<Workday> {
        let open = self
            .db
            .workdays()
            .current_open()
            .await?
            .ok_or_else(|| ServiceError::not_found("Open workday"))?;

        let products = self.db.products().list_active().await?;
        let closing_stock: StockSnapshot =
            products.iter().map(|p| (p.id, p.current_stock)).collect();

        let now = chrono::Utc::now();
        let date = dates::current_date();
        let time = dates::current_time();

        let mut tx = self.db.pool().begin().await.map_err(cantina_db::DbError::from)?;

        WorkdayRepository::close_in(&mut tx, open.id, &closing_stock, now).await?;

        for product in &products {
            MovementRepository::insert_in(
                &mut tx,
                NewMovement {
                    product_id: product.id,
                    date: date.clone(),
                    time: time.clone(),
                    quantity: product.current_stock,
                    kind: MovementKind::Closing,
                    notes: None,
                },
            )
            .await?;
        }

        PendingOpRepository::enqueue_in(
            &mut tx,
            SyncTable::Workdays,
            QueueAction::Close,
            &json!({
                "action": "close",
                "closingStock": closing_stock,
            }),
        )
        .await?;

        tx.commit().await.map_err(cantina_db::DbError::from)?;

        info!(id = open.id, "Workday closed");
        self.get(open.id).await
    }

    // =========================================================================
    // Restore Yesterday's Levels
    // =========================================================================

    /// Copies the most recent closing snapshot onto current stock, then
    /// opens a new workday with those levels.
    ///
    /// The restore itself writes no ledger rows and queues nothing: the
    /// remote store still holds exactly these levels from the prior close,
    /// and the subsequent open records them as the opening snapshot.
    pub async fn apply_prior_closing_stock(
        &self,
        responsible_person: &str,
    ) -> ServiceResult<Workday> {
        let last = self
            .db
            .workdays()
            .last_closed()
            .await?
            .ok_or_else(|| ServiceError::not_found("Closed workday"))?;

        let snapshot = last
            .closing_stock
            .ok_or_else(|| ServiceError::not_found("Closing snapshot"))?;

        let mut tx = self.db.pool().begin().await.map_err(cantina_db::DbError::from)?;
        for (&product_id, &stock) in &snapshot {
            // Products created after that close have no snapshot entry;
            // products removed since then are skipped.
            match cantina_db::ProductRepository::set_stock_in(&mut tx, product_id, stock).await {
                Ok(()) => {}
                Err(cantina_db::DbError::NotFound { .. }) => {
                    warn!(product_id, "Snapshot references a missing product; skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        tx.commit().await.map_err(cantina_db::DbError::from)?;

        info!(
            from_workday = last.id,
            products = snapshot.len(),
            "Restored prior closing stock"
        );

        self.open(responsible_person).await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The currently open workday, if any.
    pub async fn current_open(&self) -> ServiceResult<Option<Workday>> {
        Ok(self.db.workdays().current_open().await?)
    }

    /// True while a workday is open locally.
    pub async fn is_open(&self) -> ServiceResult<bool> {
        Ok(self.db.workdays().current_open().await?.is_some())
    }

    /// Gets a workday or fails with NotFound.
    pub async fn get(&self, id: i64) -> ServiceResult<Workday> {
        self.db
            .workdays()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Workday {id}")))
    }

    /// The most recently created closed workday.
    pub async fn last_closed(&self) -> ServiceResult<Option<Workday>> {
        Ok(self.db.workdays().last_closed().await?)
    }

    /// All workdays dated within [start, end].
    pub async fn workdays_in_range(&self, start: &str, end: &str) -> ServiceResult<Vec<Workday>> {
        Ok(self.db.workdays().in_range(start, end).await?)
    }

    /// Closed workdays dated within [start, end].
    pub async fn closed_in_range(&self, start: &str, end: &str) -> ServiceResult<Vec<Workday>> {
        Ok(self.db.workdays().closed_in_range(start, end).await?)
    }

    /// Operating days (closed workdays) within [start, end].
    pub async fn count_operating_days(&self, start: &str, end: &str) -> ServiceResult<i64> {
        Ok(self.db.workdays().count_operating_days(start, end).await?)
    }

    /// Most recent workdays, newest first.
    pub async fn recent(&self, limit: i64) -> ServiceResult<Vec<Workday>> {
        Ok(self.db.workdays().recent(limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::StockService;
    use axum::{routing::get, Json, Router};
    use cantina_core::WorkdayStatus;
    use cantina_db::DbConfig;

    /// Remote pointing at a never-listening port: every call is a transport
    /// error, which the service must absorb as offline mode.
    fn unreachable_remote() -> RemoteClient {
        RemoteClient::new("http://127.0.0.1:1").unwrap()
    }

    async fn offline_service() -> (WorkdayService, StockService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (
            WorkdayService::new(db.clone(), unreachable_remote()),
            StockService::new(db),
        )
    }

    /// Spawns a mock remote answering `GET /workdays` with a fixed body.
    async fn mock_remote(workdays_response: serde_json::Value) -> RemoteClient {
        let app = Router::new()
            .route("/ping", get(|| async { "ok" }))
            .route(
                "/workdays",
                get(move || {
                    let body = workdays_response.clone();
                    async move { Json(body) }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RemoteClient::new(format!("http://{addr}")).unwrap()
    }

    /// Mock remote that sees no open workday on the check and answers the
    /// synchronous `POST /workdays` confirmation with a scripted response.
    async fn mock_remote_with_open(
        post_status: axum::http::StatusCode,
        post_body: serde_json::Value,
    ) -> RemoteClient {
        let app = Router::new()
            .route("/ping", get(|| async { "ok" }))
            .route(
                "/workdays",
                get(|| async { Json(serde_json::Value::Null) }).post(
                    move |Json(_): Json<serde_json::Value>| {
                        let body = post_body.clone();
                        async move { (post_status, Json(body)) }
                    },
                ),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RemoteClient::new(format!("http://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn test_offline_open_queues_and_snapshots() {
        let (workdays, stock) = offline_service().await;

        let product = stock.create("Orange juice", "bottle").await.unwrap();
        stock.adjust(product.id, 20, None).await.unwrap();

        let workday = workdays.open("Ana").await.unwrap();
        assert!(workday.is_open());
        assert_eq!(workday.opening_stock.get(&product.id), Some(&20));
        assert_eq!(workday.responsible_person, "Ana");

        // Exactly one {workdays, open} entry queued (offline mode).
        let ops = workdays.db.pending().all().await.unwrap();
        let open_ops: Vec<_> = ops
            .iter()
            .filter(|op| op.target == SyncTable::Workdays && op.action == QueueAction::Open)
            .collect();
        assert_eq!(open_ops.len(), 1);
        assert!(open_ops[0].payload.contains("Ana"));

        // One opening snapshot movement, quantity = stock level, not queued.
        let movements = stock.product_movements(product.id, 1).await.unwrap();
        assert_eq!(movements[0].kind, MovementKind::Opening);
        assert_eq!(movements[0].quantity, 20);
    }

    #[tokio::test]
    async fn test_second_open_conflicts_locally() {
        let (workdays, _) = offline_service().await;

        workdays.open("Ana").await.unwrap();
        let err = workdays.open("Carlos").await.unwrap_err();

        match err {
            ServiceError::Conflict { responsible } => {
                assert_eq!(responsible.as_deref(), Some("Ana"));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_open_blocks_and_names_responsible() {
        let remote = mock_remote(serde_json::json!({
            "id": 1,
            "date": "2024-03-01",
            "status": "open",
            "opening_stock": {},
            "responsible_person": "Carlos",
        }))
        .await;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workdays = WorkdayService::new(db.clone(), remote);

        let err = workdays.open("Ana").await.unwrap_err();
        match err {
            ServiceError::Conflict { responsible } => {
                assert_eq!(responsible.as_deref(), Some("Carlos"));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }

        // No local row was written.
        assert!(db.workdays().current_open().await.unwrap().is_none());
        assert_eq!(db.pending().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_online_open_confirms_without_queueing() {
        let remote = mock_remote_with_open(
            axum::http::StatusCode::CREATED,
            serde_json::json!({
                "id": 7,
                "date": "2024-03-01",
                "status": "open",
                "opening_stock": {"1": 20},
                "responsible_person": "Ana",
            }),
        )
        .await;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stock = StockService::new(db.clone());
        let workdays = WorkdayService::new(db.clone(), remote);

        let product = stock.create("Orange juice", "bottle").await.unwrap();
        stock.adjust(product.id, 20, None).await.unwrap();
        let queued_before = db.pending().count().await.unwrap();

        let workday = workdays.open("Ana").await.unwrap();
        assert!(workday.is_open());
        assert_eq!(workday.opening_stock.get(&product.id), Some(&20));

        // The remote confirmed the open synchronously: nothing new to
        // replay, and no {workdays, open} entry in particular.
        assert_eq!(db.pending().count().await.unwrap(), queued_before);
        let ops = db.pending().all().await.unwrap();
        assert!(!ops
            .iter()
            .any(|op| op.target == SyncTable::Workdays && op.action == QueueAction::Open));
    }

    #[tokio::test]
    async fn test_online_open_conflict_on_confirm() {
        // The check saw no open workday but another session won the race:
        // the confirmation comes back 409 and nothing is written locally.
        let remote = mock_remote_with_open(
            axum::http::StatusCode::CONFLICT,
            serde_json::json!({"error": "There is already an open workday"}),
        )
        .await;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workdays = WorkdayService::new(db.clone(), remote);

        let err = workdays.open("Ana").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { .. }));

        assert!(db.workdays().current_open().await.unwrap().is_none());
        assert_eq!(db.pending().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_server_error_blocks_open() {
        // A 500 on the check means remote state is unknown: block, don't
        // degrade to offline mode.
        let app = Router::new().route(
            "/workdays",
            get(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "boom"})),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let workdays =
            WorkdayService::new(db.clone(), RemoteClient::new(format!("http://{addr}")).unwrap());

        let err = workdays.open("Ana").await.unwrap_err();
        assert!(matches!(err, ServiceError::Remote(RemoteError::Server { .. })));
        assert!(db.workdays().current_open().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_snapshots_and_queues() {
        let (workdays, stock) = offline_service().await;

        let product = stock.create("Coffee", "cup").await.unwrap();
        stock.adjust(product.id, 10, None).await.unwrap();
        workdays.open("Ana").await.unwrap();
        stock.decrement(product.id).await.unwrap();

        let closed = workdays.close().await.unwrap();
        assert_eq!(closed.status, WorkdayStatus::Closed);
        assert_eq!(closed.closing_stock.unwrap().get(&product.id), Some(&9));
        assert!(closed.closed_at.is_some());

        let ops = workdays.db.pending().all().await.unwrap();
        assert!(ops
            .iter()
            .any(|op| op.target == SyncTable::Workdays && op.action == QueueAction::Close));
    }

    #[tokio::test]
    async fn test_close_without_open_is_not_found_and_writes_nothing() {
        let (workdays, stock) = offline_service().await;
        stock.create("Coffee", "cup").await.unwrap();

        let before_ops = workdays.db.pending().count().await.unwrap();
        let err = workdays.close().await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert_eq!(workdays.db.pending().count().await.unwrap(), before_ops);
        let movements = stock.recent_movements(10).await.unwrap();
        assert!(movements.iter().all(|m| !m.kind.is_snapshot()));
    }

    #[tokio::test]
    async fn test_apply_prior_closing_stock_restores_and_opens() {
        let (workdays, stock) = offline_service().await;

        let juice = stock.create("Orange juice", "bottle").await.unwrap();
        let cookie = stock.create("Chocolate cookie", "unit").await.unwrap();
        stock.adjust(juice.id, 20, None).await.unwrap();
        stock.adjust(cookie.id, 5, None).await.unwrap();

        workdays.open("Ana").await.unwrap();
        workdays.close().await.unwrap();

        // Levels drift after close (e.g. a stray adjustment).
        stock.adjust(juice.id, 2, None).await.unwrap();

        let reopened = workdays.apply_prior_closing_stock("Carlos").await.unwrap();
        assert_eq!(stock.get(juice.id).await.unwrap().current_stock, 20);
        assert_eq!(stock.get(cookie.id).await.unwrap().current_stock, 5);
        assert_eq!(reopened.opening_stock.get(&juice.id), Some(&20));
        assert_eq!(reopened.opening_stock.get(&cookie.id), Some(&5));
    }

    #[tokio::test]
    async fn test_apply_prior_requires_a_closing_snapshot() {
        let (workdays, _) = offline_service().await;
        let err = workdays.apply_prior_closing_stock("Ana").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
