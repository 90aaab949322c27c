//! Persisted snapshot of the last completed run.
//!
//! The snapshot is a single JSON array of article records, overwritten
//! wholesale at the end of every run. It backs the new-vs-seen decision:
//! a record is new iff its identity key does not appear in the previous
//! snapshot. A missing or corrupt snapshot file loads as an empty set so a
//! damaged state file can never wedge the watcher.

use crate::models::ArticleRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// File-backed store for the previous run's full article set.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the previous run's records.
    ///
    /// Never fails the caller: a missing file is a first run, a corrupt file
    /// is logged and treated the same way.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Vec<ArticleRecord> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot file; treating as first run");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Could not read snapshot; treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<ArticleRecord>>(&bytes) {
            Ok(records) => {
                info!(count = records.len(), "Loaded snapshot");
                records
            }
            Err(e) => {
                warn!(error = %e, "Corrupt snapshot; treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the persisted snapshot with `records`.
    ///
    /// Full overwrite, not a merge: the file always reflects exactly the
    /// most recent completed run, including records that were not new.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = records.len()))]
    pub async fn save(&self, records: &[ArticleRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records).context("serializing snapshot")?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing snapshot to {}", self.path.display()))?;
        info!("Snapshot saved");
        Ok(())
    }

    /// Clear the snapshot, so the next run reports everything as new.
    pub async fn reset(&self) -> Result<()> {
        fs::write(&self.path, "[]")
            .await
            .with_context(|| format!("resetting snapshot at {}", self.path.display()))?;
        info!(path = %self.path.display(), "Snapshot cleared");
        Ok(())
    }
}

/// Whether `record` is absent from the previous run's set.
///
/// Compares identity keys (`link`, with the source+title fallback), so a
/// changed summary or re-parsed date does not resurrect an old article.
pub fn is_new(record: &ArticleRecord, previous: &[ArticleRecord]) -> bool {
    let key = record.identity_key();
    !previous.iter().any(|prev| prev.identity_key() == key)
}

/// The subset of `current` not present in `previous`, in `current` order.
pub fn new_records(current: &[ArticleRecord], previous: &[ArticleRecord]) -> Vec<ArticleRecord> {
    current
        .iter()
        .filter(|record| is_new(record, previous))
        .cloned()
        .collect()
}
