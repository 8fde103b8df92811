//! # Cantina Server
//!
//! The remote source of truth for Cantina store clients.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cantina Server                                   │
//! │                                                                         │
//! │  Store client ───► HTTP/JSON (axum) ───► Handlers ───► SQLite          │
//! │                                                                         │
//! │  /ping /health /products /movements /workdays /settings                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two server-side guarantees the whole fleet relies on:
//! - `/workdays` is the single arbiter of the one-open-workday invariant
//!   (transactional check-then-insert, 409 on conflict).
//! - `/movements` applies `current_stock += quantity` and logs the row in
//!   one transaction.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;

use axum::Router;

pub use config::ServerConfig;
pub use db::ServerDb;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: ServerDb,
}

/// Builds the API router over a database handle.
pub fn app(db: ServerDb) -> Router {
    routes::router(AppState { db })
}
