//! # Change Events
//!
//! Typed notifications the sync engine broadcasts to the UI layer. Each
//! event names a fact about shared state, not a command: subscribers decide
//! what to re-render or disable.

use tokio::sync::broadcast;

/// A state change another session (or the sync engine) produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// The remote open-workday lock changed. `locked` with a responsible
    /// person means another session is working; the UI disables its "open"
    /// controls while this holds.
    RemoteLock {
        locked: bool,
        responsible: Option<String>,
    },

    /// Local product rows changed underneath the UI (a pull merge or a
    /// force-close); cached stock displays are stale.
    StockUpdated,

    /// The local open workday was force-closed because the remote lock was
    /// released by another session.
    WorkdayForceClosed { workday_id: i64 },
}

/// Broadcast bus for [`ChangeEvent`]s.
///
/// Cloneable; every clone shares the same channel. Emitting with zero
/// subscribers is fine (headless runs, tests).
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        EventBus { tx }
    }

    /// Subscribes to all events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Emits an event to all current subscribers.
    pub fn emit(&self, event: ChangeEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(64)
    }
}
