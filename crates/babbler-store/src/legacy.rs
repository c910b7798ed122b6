//! One-shot import of the legacy full-snapshot format.
//!
//! Before the incremental store, the whole transition table was serialized
//! as a single gzip-compressed JSON object
//! `{"Chain": {prefix: [successor, ...]}}`. That format is read once at
//! startup and never written again.
//!
//! Completion is tracked by a marker inside the store, written in the same
//! transaction as the imported records. An import interrupted by a crash
//! leaves no marker and is retried on the next start; a snapshot that fails
//! to decode is logged, skipped for the run, and likewise left for a retry.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::traits::ChainStore;

/// A fully-decoded legacy snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacySnapshot {
    /// Prefix key -> successor list, duplicates permitted.
    #[serde(rename = "Chain", default)]
    pub chain: HashMap<String, Vec<String>>,
}

/// Outcome of the startup migration check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The store already carries the completion marker.
    AlreadyImported,
    /// No legacy snapshot exists next to the store (fresh install).
    NoSnapshot,
    /// The snapshot was imported; carries the number of records written.
    Imported(u64),
    /// A snapshot was present but unreadable; the run continues on the
    /// store as-is and the next start retries.
    Abandoned,
}

/// Expected location of the legacy snapshot for a store path: a trailing
/// `.db` swapped for `.gz`.
pub fn legacy_path(store_path: &Path) -> PathBuf {
    let name = store_path.to_string_lossy();
    let stem = name.strip_suffix(".db").unwrap_or(&name);
    PathBuf::from(format!("{stem}.gz"))
}

/// Decode a legacy snapshot file (gzip-compressed JSON).
pub fn read_snapshot(path: &Path) -> Result<LegacySnapshot> {
    let file = File::open(path)?;
    let gz = GzDecoder::new(BufReader::new(file));
    serde_json::from_reader(gz).map_err(|e| StoreError::Snapshot(e.to_string()))
}

/// Import the legacy snapshot into `store` unless it already happened.
///
/// Runs single-threaded at startup, before the engine accepts callers; it
/// needs no locking beyond the store's own transaction.
pub async fn migrate_if_needed<S: ChainStore>(
    store: &S,
    store_path: &Path,
) -> Result<MigrationOutcome> {
    if store.snapshot_imported().await? {
        return Ok(MigrationOutcome::AlreadyImported);
    }

    let source = legacy_path(store_path);
    if !source.exists() {
        return Ok(MigrationOutcome::NoSnapshot);
    }

    info!(source = %source.display(), "legacy snapshot found, importing");
    let snapshot = match read_snapshot(&source) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(
                source = %source.display(),
                error = %err,
                "cannot decode legacy snapshot, skipping import for this run"
            );
            return Ok(MigrationOutcome::Abandoned);
        }
    };

    let written = store.import_snapshot(&snapshot).await?;
    info!(
        source = %source.display(),
        records = written,
        "legacy snapshot imported"
    );
    Ok(MigrationOutcome::Imported(written))
}
