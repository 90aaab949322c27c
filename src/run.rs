//! The run controller: one complete batch pass.
//!
//! Ties the pipeline together: load the previous snapshot and scrape all
//! sites concurrently, diff the current set against the snapshot, hand new
//! records to the notifier, then persist the full current set. Persisting
//! is unconditional on notification outcome — if the email fails, the
//! snapshot still advances, so the same articles are not re-reported as new
//! on every subsequent run.

use crate::fetch::PageFetcher;
use crate::models::SiteSpec;
use crate::notify::Notifier;
use crate::scrape;
use crate::state::{self, SnapshotStore};
use anyhow::Result;
use tracing::{info, instrument, warn};

/// Outcome counts for one completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Records extracted across all sites this run.
    pub total: usize,
    /// Records not present in the previous snapshot.
    pub new: usize,
    /// Whether the notifier accepted the new records.
    pub notified: bool,
}

/// Execute one batch pass.
///
/// Snapshot load and scraping have no ordering dependency and run
/// concurrently. Errors from the notifier are demoted to warnings; only a
/// failure to persist the new snapshot fails the run.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn run_once<F: PageFetcher, N: Notifier>(
    sites: &[SiteSpec],
    fetcher: &F,
    notifier: &N,
    store: &SnapshotStore,
) -> Result<RunSummary> {
    let (previous, current) = tokio::join!(store.load(), scrape::scrape_all(sites, fetcher));
    info!(
        previous = previous.len(),
        current = current.len(),
        "Scan complete"
    );

    let fresh = state::new_records(&current, &previous);
    let mut notified = false;
    if fresh.is_empty() {
        info!("No new articles");
    } else {
        info!(count = fresh.len(), "New articles found");
        match notifier.send(&fresh).await {
            Ok(()) => notified = true,
            Err(e) => {
                warn!(error = %e, "Notification failed; snapshot will still be saved");
            }
        }
    }

    store.save(&current).await?;

    Ok(RunSummary {
        total: current.len(),
        new: fresh.len(),
        notified,
    })
}
