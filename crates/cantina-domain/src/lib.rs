//! # cantina-domain: Domain Services for Cantina
//!
//! The write- and read-side services the UI layer calls. Each service owns a
//! slice of the domain and composes the repository layer into atomic
//! multi-row transactions:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cantina Domain Services                          │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌──────────────────────────┐  │
//! │  │  StockService  │  │ WorkdayService │  │ StatsService             │  │
//! │  │  ────────────  │  │  ────────────  │  │ AlertService             │  │
//! │  │  catalog CRUD  │  │  open / close  │  │ SettingsService          │  │
//! │  │  ± 1 mutations │  │  single-open   │  │  ────────────            │  │
//! │  │  adjustments   │  │  invariant     │  │  consumption stats,      │  │
//! │  │                │  │  (local AND    │  │  minimum stock,          │  │
//! │  │                │  │   remote)      │  │  tuning settings         │  │
//! │  └───────┬────────┘  └───────┬────────┘  └────────────┬─────────────┘  │
//! │          │                   │                        │                │
//! │          ▼                   ▼                        ▼                │
//! │     cantina-db          cantina-db +             cantina-db            │
//! │                         cantina-remote                                 │
//! │                         (open handshake)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stock-changing write bundles product update + ledger row + pending
//! queue entry into one SQLite transaction; the sync engine (cantina-sync)
//! drains that queue independently.

pub mod alerts;
pub mod error;
pub mod settings;
pub mod stats;
pub mod stock;
pub mod workday;

pub use alerts::{AlertService, LowStockProduct};
pub use error::{ServiceError, ServiceResult};
pub use settings::SettingsService;
pub use stats::{DailyConsumption, ProductStats, StatsService, TopSeller};
pub use stock::StockService;
pub use workday::WorkdayService;
