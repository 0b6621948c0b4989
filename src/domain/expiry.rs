//! Expiry evaluation and the periodic purge of expired records.
//!
//! [`is_expired`] is the single definition of "expired" used by redirects,
//! inspection, listing and the sweep. [`run_expiry_sweeper`] runs [`sweep`] on
//! a fixed period until the shutdown signal is raised.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkStore;
use crate::error::AppError;

/// Returns true once `now` is strictly past `created_at + ttl_seconds`.
///
/// Records with `ttl_seconds == 0` never expire.
pub fn is_expired(record: &LinkRecord, now: DateTime<Utc>) -> bool {
    record.expires_at().is_some_and(|expires_at| now > expires_at)
}

/// Counters reported by a single sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Deletes every record that is expired at `now`.
///
/// The store is listed once; each expired record is then removed with its own
/// [`LinkStore::delete_if_expired`] call, so no lock is held across the whole
/// pass and a code re-created after the listing is left alone. Individual
/// delete failures are logged and counted without aborting the sweep.
///
/// # Errors
///
/// Returns an error only if the initial listing fails.
pub async fn sweep(store: &dyn LinkStore, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
    let links = store.list().await?;
    let mut report = SweepReport {
        scanned: links.len(),
        ..SweepReport::default()
    };

    for link in links.iter().filter(|l| is_expired(&l.record, now)) {
        match store.delete_if_expired(&link.code, now).await {
            Ok(true) => {
                debug!(code = %link.code, "Purged expired link");
                report.removed += 1;
            }
            // Deleted or replaced concurrently.
            Ok(false) => {}
            Err(e) => {
                warn!(code = %link.code, error = %e, "Failed to purge expired link");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Runs [`sweep`] every `period` until `shutdown` turns `true`.
///
/// The first pass happens one full period after start. The shutdown flag is
/// checked between passes; a pass that has started always runs to completion.
pub async fn run_expiry_sweeper(
    store: Arc<dyn LinkStore>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs = period.as_secs(), "Expiry sweeper started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match sweep(store.as_ref(), Utc::now()).await {
                    Ok(report) => info!(
                        scanned = report.scanned,
                        removed = report.removed,
                        failed = report.failed,
                        "Expired links cleaned up"
                    ),
                    Err(e) => error!(error = %e, "Expiry sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiry sweeper stopped");
}
