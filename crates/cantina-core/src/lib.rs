//! # cantina-core: Pure Domain Logic for Cantina
//!
//! Cantina is an offline-first stock tracker for a single-location cafeteria.
//! This crate is the innermost layer: domain types, input validation, and the
//! stock arithmetic shared by every other crate. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cantina Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser UI (external collaborator)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   cantina-domain (stock / workday / stats / alert services)     │   │
//! │  └──────────┬─────────────────────────────────────┬────────────────┘   │
//! │             │                                     │                    │
//! │  ┌──────────▼──────────┐              ┌───────────▼────────────┐       │
//! │  │  cantina-db         │              │  cantina-sync          │       │
//! │  │  local SQLite store │◄─────────────│  push / pull / lock    │       │
//! │  └──────────┬──────────┘              └───────────┬────────────┘       │
//! │             │                                     │                    │
//! │  ┌──────────▼─────────────────────────────────────▼────────────────┐   │
//! │  │              ★ cantina-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │ validation │  │ stock_math │  │  dates   │  │   │
//! │  │   │  Product  │  │   rules    │  │  clamping  │  │ YYYY-MM- │  │   │
//! │  │   │  Workday  │  │   checks   │  │  minimums  │  │ DD keys  │  │   │
//! │  │   └───────────┘  └────────────┘  └────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, Workday, PendingOp, ...)
//! - [`validation`] - Input validation rules
//! - [`stock_math`] - Clamped deltas, consumption averages, minimum stock
//! - [`dates`] - Calendar-date helpers (`YYYY-MM-DD`, `HH:MM:SS`)
//! - [`error`] - Validation error type

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod error;
pub mod stock_math;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use stock_math::{MinimumStock, StockLevel};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum stock level a manual adjustment may set.
///
/// A cafeteria counting more than 9999 of anything has mistyped; the bound
/// catches fat-finger entries before they reach the ledger.
pub const MAX_STOCK: i64 = 9999;

/// Default number of days the cafeteria operates per week.
/// Overridable via the `activeDaysPerWeek` setting.
pub const DEFAULT_ACTIVE_DAYS_PER_WEEK: i64 = 4;

/// Default safety margin applied on top of the consumption-based minimum.
/// Overridable via the `safetyMarginPercent` setting.
pub const DEFAULT_SAFETY_MARGIN_PERCENT: i64 = 30;

/// Default lookback window (in days) for consumption statistics.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
