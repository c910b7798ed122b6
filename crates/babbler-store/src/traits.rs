//! ChainStore trait: the abstract interface for transition persistence.
//!
//! This trait keeps the engine storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use babbler_core::TransitionRecord;

use crate::error::Result;
use crate::legacy::LegacySnapshot;

/// The ChainStore trait: async interface for the transition table.
///
/// # Design Notes
///
/// - **Missing keys are empty**: `get` returns an empty record, never an
///   error, for a prefix with no observations yet.
/// - **Whole-record writes**: `put` overwrites the full record. Callers
///   read-modify-write and must serialize their access themselves (the
///   engine's gate); the store makes no cross-call atomicity promise.
/// - **One-shot import**: `import_snapshot` writes every record and the
///   completion marker in a single transaction, so an interrupted import
///   leaves either nothing or everything.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Fetch the successor record for a prefix key.
    async fn get(&self, key: &str) -> Result<TransitionRecord>;

    /// Overwrite the successor record for a prefix key.
    async fn put(&self, key: &str, record: &TransitionRecord) -> Result<()>;

    /// Number of records in the transition table. The import marker does
    /// not count.
    async fn record_count(&self) -> Result<u64>;

    /// Whether a legacy snapshot import has completed against this store.
    async fn snapshot_imported(&self) -> Result<bool>;

    /// Import a decoded legacy snapshot: every successor list is
    /// deduplicated in first-occurrence order, then all records plus the
    /// completion marker are written in one transaction.
    ///
    /// Returns the number of records written.
    async fn import_snapshot(&self, snapshot: &LegacySnapshot) -> Result<u64>;
}
