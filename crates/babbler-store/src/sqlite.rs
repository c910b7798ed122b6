//! SQLite implementation of the ChainStore trait.
//!
//! This is the primary backend. The `chain` table is the named partition
//! holding prefix -> successor-list rows; rusqlite with bundled SQLite,
//! wrapped in async via `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use babbler_core::TransitionRecord;

use crate::error::{Result, StoreError};
use crate::legacy::LegacySnapshot;
use crate::schema;
use crate::traits::ChainStore;

/// Key in the `meta` table marking a completed legacy snapshot import.
const META_SNAPSHOT_IMPORTED: &str = "snapshot_imported";

const UPSERT_RECORD: &str = "INSERT INTO chain (prefix, successors) VALUES (?1, ?2)
     ON CONFLICT(prefix) DO UPDATE SET successors = excluded.successors";

/// SQLite-based store implementation.
///
/// Thread-safe via an internal Mutex; all operations run on the blocking
/// pool. The database is opened in exclusive locking mode with a short busy
/// timeout, so a second process opening the same file fails fast instead of
/// hanging on the lock.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open the store at `path`, creating the file and schema if absent.
    ///
    /// The backing file is created with owner-only permissions.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        create_owner_only(path)?;

        let mut conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(1))?;
        conn.pragma_update(None, "locking_mode", "exclusive")?;
        // The first write takes the exclusive file lock for the lifetime of
        // the connection, or fails with SQLITE_BUSY once the timeout runs
        // out. Schema init is that first write.
        schema::init(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        schema::init(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("connection mutex poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {e}")))?
    }
}

/// Pre-create `path` with mode 0600 so SQLite inherits it. Existing files
/// are left untouched.
fn create_owner_only(path: &Path) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)?;
    Ok(())
}

#[async_trait]
impl ChainStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<TransitionRecord> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            debug!(key = %key, "reading record");
            let encoded: Option<String> = conn
                .query_row(
                    "SELECT successors FROM chain WHERE prefix = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;

            match encoded {
                Some(json) => Ok(serde_json::from_str(&json)?),
                None => Ok(TransitionRecord::new()),
            }
        })
        .await
    }

    async fn put(&self, key: &str, record: &TransitionRecord) -> Result<()> {
        let key = key.to_string();
        let encoded = serde_json::to_string(record)?;
        self.with_conn(move |conn| {
            debug!(key = %key, bytes = encoded.len(), "writing record");
            conn.execute(UPSERT_RECORD, params![key, encoded])?;
            Ok(())
        })
        .await
    }

    async fn record_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM chain", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn snapshot_imported(&self) -> Result<bool> {
        self.with_conn(|conn| {
            let marker: Option<String> = conn
                .query_row(
                    "SELECT value FROM meta WHERE key = ?1",
                    params![META_SNAPSHOT_IMPORTED],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(marker.is_some())
        })
        .await
    }

    async fn import_snapshot(&self, snapshot: &LegacySnapshot) -> Result<u64> {
        let snapshot = snapshot.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let mut written = 0u64;
            for (key, successors) in &snapshot.chain {
                let record = TransitionRecord::from_words(successors);
                if record.len() < successors.len() {
                    debug!(
                        key = %key,
                        from = successors.len(),
                        to = record.len(),
                        "deduplicated successor list on import"
                    );
                }
                let encoded = serde_json::to_string(&record)?;
                tx.execute(UPSERT_RECORD, params![key, encoded])?;
                written += 1;
            }

            tx.execute(
                "INSERT INTO meta (key, value) VALUES (?1, '1')
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![META_SNAPSHOT_IMPORTED],
            )?;

            tx.commit()?;
            Ok(written)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_get_missing_key_is_empty() {
        let store = SqliteStore::open_memory().unwrap();
        let record = store.get("never written").await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_put_get_round_trip_keeps_order() {
        let store = SqliteStore::open_memory().unwrap();
        let record = TransitionRecord::from_words(["zulu", "alpha", "mike"]);

        store.put("the quick", &record).await.unwrap();
        let read = store.get("the quick").await.unwrap();
        assert_eq!(read, record);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .put("k", &TransitionRecord::from_words(["one"]))
            .await
            .unwrap();
        store
            .put("k", &TransitionRecord::from_words(["one", "two"]))
            .await
            .unwrap();

        let read = store.get("k").await.unwrap();
        assert_eq!(read.words(), ["one", "two"]);
    }

    #[tokio::test]
    async fn test_record_count_ignores_marker() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.record_count().await.unwrap(), 0);

        store
            .put(" fox", &TransitionRecord::from_words(["jumps"]))
            .await
            .unwrap();
        store
            .import_snapshot(&LegacySnapshot { chain: HashMap::new() })
            .await
            .unwrap();

        // The marker row lives in meta, not chain.
        assert_eq!(store.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_dedups_and_sets_marker() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(!store.snapshot_imported().await.unwrap());

        let mut chain = HashMap::new();
        chain.insert(
            "the quick".to_string(),
            vec!["fox".to_string(), "fox".to_string(), "dog".to_string()],
        );
        let written = store
            .import_snapshot(&LegacySnapshot { chain })
            .await
            .unwrap();

        assert_eq!(written, 1);
        assert!(store.snapshot_imported().await.unwrap());
        let record = store.get("the quick").await.unwrap();
        assert_eq!(record.words(), ["fox", "dog"]);
    }

    #[tokio::test]
    async fn test_open_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.db");

        let _held = SqliteStore::open(&path).unwrap();
        // The first handle retains the exclusive file lock, so a second
        // open must fail fast rather than hang.
        assert!(SqliteStore::open(&path).is_err());
    }

    #[tokio::test]
    async fn test_reopen_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .put("k", &TransitionRecord::from_words(["v"]))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("k").await.unwrap().words(), ["v"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.db");
        let _store = SqliteStore::open(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
