//! # cantina-sync: Sync Engine for Cantina
//!
//! Keeps the local SQLite cache and the remote source of truth converging:
//!
//! - **Push** ([`push::push_changes`]): drains the durable pending queue in
//!   dependency order with terminal-failure handling.
//! - **Pull** ([`pull::pull_products`]): last-writer-wins catalog merge,
//!   matched by product name.
//! - **Heartbeat** ([`pull::pull_active_workday`]): observes the remote
//!   open-workday lock and force-closes a locally-stale session.
//! - **Agent** ([`agent::SyncAgent`]): runs the cycle on an interval and on
//!   reconnection, broadcasting [`events::ChangeEvent`]s to the UI.
//!
//! The engine never blocks the UI: domain writes land locally and enqueue;
//! this crate settles the remote side later.

pub mod agent;
pub mod config;
pub mod error;
pub mod events;
pub mod pull;
pub mod push;

pub use agent::{SyncAgent, SyncAgentHandle};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use events::{ChangeEvent, EventBus};
pub use push::{PushSummary, MAX_PUSH_ATTEMPTS};
