//! # Sync Agent
//!
//! The background task that runs the sync cycle:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   ping ──► push_changes ──► pull_products ──► pull_active_workday      │
//! │                                                                         │
//! │   Runs: on start, on every tick of the configured interval, and        │
//! │   the cycle immediately after an offline→online transition repays      │
//! │   whatever queued up while offline.                                     │
//! │                                                                         │
//! │   Push strictly precedes pull within a cycle, and cycles are           │
//! │   sequential by construction (one task): a pull can never clobber a    │
//! │   local change that hasn't had its push attempt yet.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::events::EventBus;
use crate::{pull, push};
use cantina_db::Database;
use cantina_remote::RemoteClient;

/// Background sync task.
pub struct SyncAgent {
    db: Database,
    remote: RemoteClient,
    bus: EventBus,
    interval: Duration,
}

impl SyncAgent {
    /// Creates an agent from its collaborators.
    pub fn new(db: Database, remote: RemoteClient, bus: EventBus, config: &SyncConfig) -> Self {
        SyncAgent {
            db,
            remote,
            bus,
            interval: Duration::from_secs(config.sync.interval_secs),
        }
    }

    /// Creates an agent plus the event bus it broadcasts on, sized by
    /// `sync.event_buffer`. The returned bus is the subscription handle for
    /// the UI layer.
    pub fn with_bus(db: Database, remote: RemoteClient, config: &SyncConfig) -> (Self, EventBus) {
        let bus = EventBus::new(config.sync.event_buffer);
        let agent = SyncAgent::new(db, remote, bus.clone(), config);
        (agent, bus)
    }

    /// Spawns the agent loop and returns its control handle.
    pub fn start(self) -> SyncAgentHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let join = tokio::spawn(self.run(shutdown_rx));
        SyncAgentHandle { shutdown_tx, join }
    }

    async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        info!(interval_secs = self.interval.as_secs(), "Sync agent started");

        let mut ticker = interval(self.interval);
        let mut was_online = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let online = self.remote.is_online().await;

                    if online && !was_online {
                        info!("Remote reachable; draining offline backlog");
                    }
                    was_online = online;

                    if online {
                        self.cycle().await;
                    } else {
                        debug!("Remote unreachable; skipping cycle");
                    }
                }

                _ = shutdown_rx.recv() => {
                    info!("Sync agent shutting down");
                    break;
                }
            }
        }
    }

    /// One full sync cycle. Each phase is best-effort: a failing phase is
    /// logged and the next one still runs.
    pub async fn cycle(&self) {
        if let Err(err) = push::push_changes(&self.db, &self.remote).await {
            error!(%err, "Push pass failed");
        }

        if let Err(err) = pull::pull_products(&self.db, &self.remote, &self.bus).await {
            error!(%err, "Product pull failed");
        }

        if let Err(err) = pull::pull_active_workday(&self.db, &self.remote, &self.bus).await {
            error!(%err, "Workday heartbeat failed");
        }
    }
}

/// Handle for controlling a running [`SyncAgent`].
pub struct SyncAgentHandle {
    shutdown_tx: mpsc::Sender<()>,
    join: tokio::task::JoinHandle<()>,
}

impl SyncAgentHandle {
    /// Signals the agent to stop and waits for the loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChangeEvent;
    use cantina_db::DbConfig;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn test_with_bus_honors_configured_capacity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let remote = RemoteClient::new("http://127.0.0.1:1").unwrap();

        let mut config = SyncConfig::default();
        config.sync.event_buffer = 1;

        let (_agent, bus) = SyncAgent::with_bus(db, remote, &config);
        let mut events = bus.subscribe();

        // A one-slot buffer keeps only the newest undelivered event; the
        // slow subscriber observes the overflow as a lag.
        bus.emit(ChangeEvent::StockUpdated);
        bus.emit(ChangeEvent::WorkdayForceClosed { workday_id: 1 });

        assert!(matches!(events.try_recv(), Err(TryRecvError::Lagged(1))));
        assert_eq!(
            events.try_recv().unwrap(),
            ChangeEvent::WorkdayForceClosed { workday_id: 1 }
        );
    }
}
