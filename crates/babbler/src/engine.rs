//! The chain engine: ingestion and generation over the transition store.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use babbler_core::{seed_key, tokenize, Prefix};
use babbler_store::{migrate_if_needed, ChainStore, SqliteStore};

use crate::config::EngineConfig;
use crate::error::Result;

/// Handle token stripped from the front of generation seeds when the
/// engine is addressed directly.
// TODO: take the handle from configuration instead of hardcoding it.
const BOT_HANDLE: &str = "@babbler_bot";

/// Seed candidates at or below this byte length are ignored; short
/// stop-words make poor starting points.
const MIN_SEED_LEN: usize = 3;

/// Output of a generation call.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The produced words, space-joined. Empty is a valid outcome (empty
    /// chain or an immediate dead end).
    pub text: String,
    /// Wall-clock time for the whole call, cold reads included.
    pub elapsed: Duration,
}

/// Aggregate counters for observability.
#[derive(Debug, Clone, Copy)]
pub struct EngineStats {
    /// Number of prefixes with at least one recorded successor.
    pub record_count: u64,
}

/// The chain engine.
///
/// All store access — every read-modify-write of an ingest loop and every
/// read of a generation walk — is serialized behind one gate. An ingest
/// call owns the store for its entire token loop and a generate call for
/// its entire walk, so no successor list is ever read and written by two
/// callers at once and no update is silently lost. The cost is throughput:
/// a slow backend serializes every concurrent caller behind the gate. That
/// trade-off is deliberate.
pub struct ChainEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
    gate: Mutex<()>,
}

impl ChainEngine<SqliteStore> {
    /// Open the store at `path` (created if absent), run the legacy
    /// snapshot import if one is pending, and return a ready engine.
    ///
    /// An open or lock failure on the backing file is fatal and surfaces
    /// here; it is never retried automatically.
    pub async fn open(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        let store = SqliteStore::open(path)?;
        migrate_if_needed(&store, path).await?;
        Ok(Self::new(store, config))
    }
}

impl<S: ChainStore> ChainEngine<S> {
    /// Wrap an already-opened store.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Learn from one inbound message.
    ///
    /// Tokenizes on whitespace and records each word as a successor of the
    /// prefix window preceding it. Best-effort: the first store failure is
    /// logged and aborts the remaining tokens of this call, but words
    /// already written stand.
    pub async fn ingest(&self, text: &str) -> Result<()> {
        let _guard = self.gate.lock().await;

        let mut prefix = Prefix::empty(self.config.prefix_len);
        for word in tokenize(text) {
            let key = prefix.key();

            let mut record = match self.store.get(&key).await {
                Ok(record) => record,
                Err(err) => {
                    error!(key = %key, error = %err, "read failed, aborting ingest");
                    return Err(err.into());
                }
            };

            if record.insert(word) {
                debug!(key = %key, word = %word, "recording successor");
                if let Err(err) = self.store.put(&key, &record).await {
                    error!(key = %key, error = %err, "write failed, aborting ingest");
                    return Err(err.into());
                }
            }

            prefix.shift(word);
        }

        Ok(())
    }

    /// Generate at most `max_words` words of chain text, biased towards
    /// `seed_text` when possible.
    ///
    /// The walk starts from the seed word's position-one record if any
    /// candidate from `seed_text` has one, otherwise from the start of
    /// chain. It ends at `max_words` or on the first prefix with no
    /// recorded successors, whichever comes first; zero words is a valid
    /// outcome. Elapsed wall-clock time is part of the result.
    pub async fn generate(&self, max_words: usize, seed_text: &str) -> Result<Generated> {
        let started = Instant::now();
        let _guard = self.gate.lock().await;

        let mut prefix = Prefix::empty(self.config.prefix_len);
        if let Some(seed) = self.pick_seed(seed_text).await {
            debug!(seed = %seed, "seeding walk");
            prefix.shift(&seed);
        }

        let mut words: Vec<String> = Vec::new();
        for _ in 0..max_words {
            let key = prefix.key();
            let record = self.store.get(&key).await?;

            let Some(next) = record.words().choose(&mut rand::thread_rng()).cloned() else {
                debug!(key = %key, "no successors, stopping walk");
                break;
            };

            prefix.shift(&next);
            words.push(next);
        }

        Ok(Generated {
            text: words.join(" "),
            elapsed: started.elapsed(),
        })
    }

    /// Generate with the configured word cap.
    pub async fn reply(&self, seed_text: &str) -> Result<Generated> {
        self.generate(self.config.max_words, seed_text).await
    }

    /// Read-only aggregate counters.
    pub async fn stats(&self) -> Result<EngineStats> {
        let _guard = self.gate.lock().await;
        let record_count = self.store.record_count().await?;
        Ok(EngineStats { record_count })
    }

    /// Pick the seed word: strip our own handle, keep words longer than
    /// `MIN_SEED_LEN` bytes, shuffle, and probe the seed index for each
    /// candidate until one has recorded successors.
    ///
    /// A failed lookup is logged and that candidate skipped; no candidate
    /// matching means the caller walks from the start of chain.
    async fn pick_seed(&self, seed_text: &str) -> Option<String> {
        let stripped = seed_text.strip_prefix(BOT_HANDLE).unwrap_or(seed_text);
        let mut candidates: Vec<&str> = stripped
            .split(' ')
            .filter(|word| word.len() > MIN_SEED_LEN)
            .collect();
        candidates.shuffle(&mut rand::thread_rng());

        for candidate in candidates {
            match self.store.get(&seed_key(candidate)).await {
                Ok(record) if !record.is_empty() => {
                    return Some(candidate.to_string());
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        word = %candidate,
                        error = %err,
                        "seed lookup failed, skipping candidate"
                    );
                }
            }
        }

        None
    }
}
