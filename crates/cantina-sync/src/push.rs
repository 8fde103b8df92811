//! # Push: Draining the Pending Queue
//!
//! Replays queued local mutations against the remote store, parents first.
//!
//! ## Ordering
//! Entries are sorted by table precedence (products < settings < workdays <
//! movements), then by queue id. Movements reference products; replaying a
//! movement before its product exists remotely is a guaranteed foreign-key
//! rejection.
//!
//! ## Failure Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  2xx                                → delete entry (confirmed)          │
//! │  server error naming a foreign key  → delete entry (unrecoverable:     │
//! │                                       local/remote ids diverged)        │
//! │  404 on a close action              → delete entry (already closed)    │
//! │  anything else                      → attempts += 1, keep for retry    │
//! │  attempts ≥ MAX_PUSH_ATTEMPTS       → skip (kept for inspection)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is at-least-once: a crash between the remote 2xx and the local
//! delete replays the entry. `/movements` applies deltas, so a replayed
//! movement double-counts - accepted for this deployment scale.

use tracing::{debug, info, warn};

use crate::error::SyncResult;
use cantina_core::{PendingOp, QueueAction};
use cantina_db::Database;
use cantina_remote::{RemoteClient, RemoteError};

/// Retry bound per queue entry. Entries at the bound stop being sent but
/// stay in the table for operator inspection.
pub const MAX_PUSH_ATTEMPTS: i64 = 10;

/// Outcome counts of one push pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    /// Entries confirmed by the remote and deleted.
    pub pushed: usize,
    /// Entries deleted under a terminal-failure rule.
    pub dropped: usize,
    /// Entries that failed and stay queued.
    pub failed: usize,
    /// Entries over the retry bound, not sent.
    pub skipped: usize,
}

/// Sorts queue entries into push order: table precedence, then queue id.
fn push_order(ops: &mut [PendingOp]) {
    ops.sort_by_key(|op| (op.target.precedence(), op.id));
}

/// True for the server-rejection that can never succeed on retry: the
/// payload references an id the remote does not have.
fn is_foreign_key_rejection(err: &RemoteError) -> bool {
    match err {
        RemoteError::Server { message, .. } => message.to_lowercase().contains("foreign key"),
        _ => false,
    }
}

/// Pushes all pending operations to the remote store. No-op when offline.
pub async fn push_changes(db: &Database, remote: &RemoteClient) -> SyncResult<PushSummary> {
    let mut summary = PushSummary::default();

    if !remote.is_online().await {
        debug!("Remote unreachable; skipping push");
        return Ok(summary);
    }

    let mut ops = db.pending().all().await?;
    if ops.is_empty() {
        return Ok(summary);
    }
    push_order(&mut ops);

    info!(count = ops.len(), "Pushing pending changes");

    for op in ops {
        if op.attempts >= MAX_PUSH_ATTEMPTS {
            warn!(
                id = op.id,
                attempts = op.attempts,
                last_error = op.last_error.as_deref().unwrap_or("-"),
                "Queue entry over retry bound; skipping"
            );
            summary.skipped += 1;
            continue;
        }

        let payload: serde_json::Value = serde_json::from_str(&op.payload)?;

        match remote.post_raw(op.target.endpoint(), &payload).await {
            Ok(()) => {
                db.pending().delete(op.id).await?;
                summary.pushed += 1;
            }
            Err(err) if is_foreign_key_rejection(&err) => {
                // Local ids never made it remote (offline-created data);
                // retrying forever would wedge the queue behind this entry.
                warn!(id = op.id, %err, "Dropping entry rejected by foreign key");
                db.pending().delete(op.id).await?;
                summary.dropped += 1;
            }
            Err(RemoteError::NotFound) if op.action == QueueAction::Close => {
                // The workday is already closed remotely; mission accomplished.
                warn!(id = op.id, "Remote workday already closed; dropping close entry");
                db.pending().delete(op.id).await?;
                summary.dropped += 1;
            }
            Err(err) => {
                debug!(id = op.id, %err, "Push failed; entry stays queued");
                db.pending().record_failure(op.id, &err.to_string()).await?;
                summary.failed += 1;
            }
        }
    }

    info!(
        pushed = summary.pushed,
        dropped = summary.dropped,
        failed = summary.failed,
        skipped = summary.skipped,
        "Push pass complete"
    );

    Ok(summary)
}

// =============================================================================
// Unit Tests
// =============================================================================
