//! # cantina-db: Local Store for Cantina
//!
//! The embedded, transactional local store the client core runs against:
//! SQLite via sqlx, durable across restarts, holding the cached domain
//! entities plus the pending-operations queue.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cantina Local Data Flow                          │
//! │                                                                         │
//! │  Domain service call (e.g. StockService::decrement)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cantina-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│  product      │    │  (embedded)  │   │   │
//! │  │   │               │    │  movement     │    │              │   │   │
//! │  │   │ SqlitePool    │    │  workday      │    │ 001_initial_ │   │   │
//! │  │   │ WAL mode      │    │  setting      │    │ schema.sql   │   │   │
//! │  │   │               │    │  pending      │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or :memory: in tests)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//! Multi-row mutations (stock update + ledger row + queue entry; workday
//! open/close with their snapshot movements) must commit atomically so a
//! crash cannot leave a snapshot without its ledger entries. Repositories
//! therefore expose `*_in` associated functions taking a
//! `&mut SqliteConnection`; domain services begin the transaction on
//! [`Database::pool`] and thread it through.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::movement::{MovementRepository, NewMovement};
pub use repository::pending::PendingOpRepository;
pub use repository::product::ProductRepository;
pub use repository::setting::SettingRepository;
pub use repository::workday::WorkdayRepository;
