//! # Domain Types
//!
//! Core domain types used throughout Cantina.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Movement     │   │    Workday      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  product_id     │   │  status         │       │
//! │  │  name (match    │   │  quantity (the  │   │  opening_stock  │       │
//! │  │   key for sync) │   │   APPLIED delta)│   │  closing_stock  │       │
//! │  │  current_stock  │   │  kind           │   │  responsible    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   PendingOp     │   │    Setting      │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  durable queue  │   │  key → JSON     │                             │
//! │  │  entry awaiting │   │  value, upsert  │                             │
//! │  │  remote confirm │   │  only           │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Local ids are SQLite rowid surrogates (`i64`, monotonic). They are never
//! unified with remote ids: the pull path matches products **by name**, and
//! the pending queue relies on id monotonicity for chronological ordering.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Stock Snapshot
// =============================================================================

/// Map of product id → stock level, frozen at workday open/close time.
///
/// BTreeMap keeps snapshot JSON deterministic, which makes ledger diffs and
/// test assertions stable.
pub type StockSnapshot = BTreeMap<i64, i64>;

// =============================================================================
// Product
// =============================================================================

/// A tracked cafeteria product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Local surrogate key (SQLite rowid). Not shared with the remote store.
    pub id: i64,

    /// Display name. Unique locally; the sync pull path matches remote rows
    /// against local rows by this field.
    pub name: String,

    /// Unit label shown next to quantities ("unit", "bottle", ...).
    pub unit: String,

    /// Current stock level. Never negative: decrements clamp at 0.
    pub current_stock: i64,

    /// Soft-delete flag. Archived products keep their ledger history.
    pub is_active: bool,

    /// When the product was created locally.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Movement
// =============================================================================

/// The typed reason for a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// A unit left the counter. Quantity is ≤ 0 (0 when clamped).
    Sale,
    /// A unit was added to stock. Quantity is positive.
    Restock,
    /// Manual recount/correction. Quantity is the signed difference.
    Adjustment,
    /// Informational snapshot written at workday open. NOT a stock delta:
    /// quantity records the stock level as of opening and must never be
    /// replayed into a stock-mutating endpoint.
    Opening,
    /// Informational snapshot written at workday close. Same semantics as
    /// [`MovementKind::Opening`].
    Closing,
}

impl MovementKind {
    /// Returns true for the open/close snapshot kinds, which record a stock
    /// *level* rather than a stock *delta*.
    pub fn is_snapshot(&self) -> bool {
        matches!(self, MovementKind::Opening | MovementKind::Closing)
    }

    /// Wire name used by the remote `/movements` endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "sale",
            MovementKind::Restock => "restock",
            MovementKind::Adjustment => "adjustment",
            MovementKind::Opening => "opening",
            MovementKind::Closing => "closing",
        }
    }
}

/// One immutable ledger entry recording a stock quantity delta.
///
/// Movements are append-only: they are never updated after creation. They
/// double as the audit trail and as the raw data for consumption statistics
/// (sum of sale magnitudes over date ranges).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: i64,

    /// Back-reference to the product. The ledger does not own the product.
    pub product_id: i64,

    /// Calendar date key, `YYYY-MM-DD`. Indexed together with product_id
    /// for consumption range queries.
    pub date: String,

    /// Wall-clock time, `HH:MM:SS`.
    pub time: String,

    /// The *applied* signed delta, not the requested one. A clamped
    /// decrement at stock 0 records quantity 0, not -1.
    pub quantity: i64,

    pub kind: MovementKind,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Workday
// =============================================================================

/// Lifecycle state of a workday (shift session).
///
/// The transition is one-way: a workday is created `Open` and moves exactly
/// once to `Closed`. No workday is ever deleted or reopened. System-wide,
/// at most one workday is `Open` at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum WorkdayStatus {
    Open,
    Closed,
}

/// One open-to-close operational shift; the unit of stock snapshotting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Workday {
    pub id: i64,

    /// Calendar date the shift belongs to, `YYYY-MM-DD`. Not unique:
    /// backdated or same-day repeated entries exist, which is why
    /// "most recent workday" queries order by id, never by this string.
    pub date: String,

    pub status: WorkdayStatus,

    /// Stock levels of all active products at open time.
    pub opening_stock: StockSnapshot,

    /// Stock levels at close time. Present only once closed.
    pub closing_stock: Option<StockSnapshot>,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Who opened the shift. Shown to other sessions when their open
    /// attempt conflicts with this one.
    pub responsible_person: String,
}

impl Workday {
    /// True while this shift is the active session.
    pub fn is_open(&self) -> bool {
        self.status == WorkdayStatus::Open
    }
}

// =============================================================================
// Pending Sync Operations
// =============================================================================

/// Local table a queued mutation originated from.
///
/// The variant order encodes push precedence: movements reference products
/// and must not be replayed before their parent product exists remotely;
/// settings and workdays are independent singletons that follow products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SyncTable {
    Products,
    Settings,
    Workdays,
    Movements,
}

impl SyncTable {
    /// Push ordering rank. Lower ranks are sent first.
    pub fn precedence(&self) -> u8 {
        match self {
            SyncTable::Products => 1,
            SyncTable::Settings => 2,
            SyncTable::Workdays => 3,
            SyncTable::Movements => 4,
        }
    }

    /// Remote endpoint this table's payloads are POSTed to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SyncTable::Products => "/products",
            SyncTable::Settings => "/settings",
            SyncTable::Workdays => "/workdays",
            SyncTable::Movements => "/movements",
        }
    }
}

/// What the queued payload asks the remote to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum QueueAction {
    /// Create a row (products).
    Create,
    /// Record a stock-mutating movement (movements).
    Record,
    /// Open a workday (workdays).
    Open,
    /// Close the open workday (workdays). A remote 404 on close means
    /// "already closed" and is treated as success.
    Close,
    /// Upsert a setting (settings).
    Upsert,
}

/// A durable queue entry: a local mutation not yet confirmed by the remote
/// source of truth.
///
/// Entries are deleted only after remote confirmation, or under the two
/// defined terminal-failure conditions (foreign-key rejection, redundant
/// close). Everything else stays queued for at-least-once retry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PendingOp {
    /// Monotonic id (AUTOINCREMENT). Within one table this is the
    /// chronological push order.
    pub id: i64,

    pub target: SyncTable,

    pub action: QueueAction,

    /// JSON body POSTed verbatim to the endpoint mapped from `target`.
    pub payload: String,

    /// Number of failed push attempts so far.
    pub attempts: i64,

    /// Message from the most recent failed attempt.
    pub last_error: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Setting
// =============================================================================

/// A key → JSON value configuration entry. Upsert semantics, no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_precedence_order() {
        // Parents before children: movements reference products.
        assert!(SyncTable::Products.precedence() < SyncTable::Settings.precedence());
        assert!(SyncTable::Settings.precedence() < SyncTable::Workdays.precedence());
        assert!(SyncTable::Workdays.precedence() < SyncTable::Movements.precedence());
    }

    #[test]
    fn test_snapshot_kinds() {
        assert!(MovementKind::Opening.is_snapshot());
        assert!(MovementKind::Closing.is_snapshot());
        assert!(!MovementKind::Sale.is_snapshot());
        assert!(!MovementKind::Restock.is_snapshot());
        assert!(!MovementKind::Adjustment.is_snapshot());
    }

    #[test]
    fn test_movement_kind_wire_names() {
        assert_eq!(MovementKind::Sale.as_str(), "sale");
        assert_eq!(MovementKind::Adjustment.as_str(), "adjustment");
    }

    #[test]
    fn test_snapshot_serializes_with_string_keys() {
        let mut snapshot = StockSnapshot::new();
        snapshot.insert(1, 20);
        snapshot.insert(2, 5);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"1":20,"2":5}"#);

        let back: StockSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_workday_status_serde() {
        assert_eq!(
            serde_json::to_string(&WorkdayStatus::Open).unwrap(),
            r#""open""#
        );
        let status: WorkdayStatus = serde_json::from_str(r#""closed""#).unwrap();
        assert_eq!(status, WorkdayStatus::Closed);
    }
}
