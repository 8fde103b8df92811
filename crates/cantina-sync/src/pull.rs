//! # Pull: Remote → Local Merges
//!
//! Two best-effort pulls run after every push:
//!
//! - [`pull_products`]: catalog merge. Remote rows are matched to local rows
//!   BY NAME - the two stores never share ids - and the remote version wins
//!   (last-writer-wins; callers push first so confirmed local changes are
//!   already reflected remotely).
//! - [`pull_active_workday`]: the remote-lock heartbeat. Compares the remote
//!   open workday against the local one and broadcasts the lock state; never
//!   auto-joins a remote session.

use tracing::{debug, info, warn};

use crate::error::SyncResult;
use crate::events::{ChangeEvent, EventBus};
use cantina_db::{Database, ProductRepository};
use cantina_remote::RemoteClient;

/// Merges the remote product catalog into the local store. No-op when
/// offline. Returns the number of remote rows merged.
pub async fn pull_products(
    db: &Database,
    remote: &RemoteClient,
    bus: &EventBus,
) -> SyncResult<usize> {
    let remote_products = match remote.fetch_products().await {
        Ok(products) => products,
        Err(err) => {
            // Best-effort: a failed pull leaves the local cache as-is.
            debug!(%err, "Product pull unavailable");
            return Ok(0);
        }
    };

    if remote_products.is_empty() {
        return Ok(0);
    }

    // Resolve name matches before opening the write transaction; on a
    // single-connection pool a pool read would wait on the transaction's
    // own connection.
    let mut plan = Vec::with_capacity(remote_products.len());
    for rp in &remote_products {
        let local_id = db.products().get_by_name(&rp.name).await?.map(|p| p.id);
        plan.push((rp, local_id));
    }

    let mut tx = db.pool().begin().await.map_err(cantina_db::DbError::from)?;

    for (rp, local_id) in plan {
        // The remote schema has no stock floor; never import a negative.
        let stock = rp.current_stock.max(0);

        match local_id {
            Some(id) => {
                ProductRepository::apply_remote_in(&mut tx, id, stock, &rp.unit, rp.is_active)
                    .await?;
            }
            None => {
                ProductRepository::insert_in(
                    &mut tx,
                    &rp.name,
                    &rp.unit,
                    stock,
                    rp.is_active,
                    chrono::Utc::now(),
                )
                .await?;
            }
        }
    }

    tx.commit().await.map_err(cantina_db::DbError::from)?;

    info!(count = remote_products.len(), "Merged remote products");
    bus.emit(ChangeEvent::StockUpdated);

    Ok(remote_products.len())
}

/// Heartbeat against the remote open-workday lock. No-op when offline.
///
/// ## Cases
/// - Remote open, local none → broadcast the lock (another session works).
/// - Remote none, local none → broadcast the release.
/// - Remote none, local open → the remote session ended; force-close the
///   local workday - UNLESS a local `{workdays, open}` entry is still
///   queued, in which case the remote simply hasn't heard about us yet.
/// - Remote open, local open → no action. Nothing ties a local open to its
///   remote counterpart, so both sessions proceed on the assumption they
///   are the same one.
pub async fn pull_active_workday(
    db: &Database,
    remote: &RemoteClient,
    bus: &EventBus,
) -> SyncResult<()> {
    let remote_open = match remote.fetch_open_workday().await {
        Ok(workday) => workday,
        Err(err) => {
            debug!(%err, "Workday heartbeat unavailable");
            return Ok(());
        }
    };

    let local_open = db.workdays().current_open().await?;

    match (remote_open, local_open) {
        (Some(remote_wd), None) => {
            info!(responsible = %remote_wd.responsible_person, "Remote session holds the lock");
            bus.emit(ChangeEvent::RemoteLock {
                locked: true,
                responsible: Some(remote_wd.responsible_person),
            });
        }

        (None, None) => {
            bus.emit(ChangeEvent::RemoteLock {
                locked: false,
                responsible: None,
            });
        }

        (None, Some(local_wd)) => {
            let pending_opens = db.pending().count_open_workday_ops().await?;
            if pending_opens == 0 {
                warn!(id = local_wd.id, "Remote session closed; force-closing local workday");
                db.workdays().mark_closed(local_wd.id, chrono::Utc::now()).await?;
                bus.emit(ChangeEvent::WorkdayForceClosed {
                    workday_id: local_wd.id,
                });
                bus.emit(ChangeEvent::StockUpdated);
            } else {
                debug!("Local open not yet pushed; skipping force-close");
            }
        }

        (Some(_), Some(_)) => {}
    }

    Ok(())
}
