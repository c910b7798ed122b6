//! # Babbler
//!
//! A persistent, incrementally-updated n-gram text model. Inbound text is
//! tokenized into a transition table held in an embedded store; replies are
//! produced by a seed-biased random walk over that table. A one-shot
//! importer converts the legacy gzip whole-corpus snapshot format into the
//! incremental store on first start.
//!
//! ## Overview
//!
//! The [`ChainEngine`] is the whole API surface consumed by a chat
//! transport: [`ingest`](ChainEngine::ingest) learns from a message,
//! [`generate`](ChainEngine::generate) produces a reply with its elapsed
//! wall-clock time, [`stats`](ChainEngine::stats) reports the record count.
//! Many lightweight tasks may call all three concurrently; the engine
//! serializes store access internally.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use babbler::{ChainEngine, EngineConfig};
//!
//! async fn example() -> babbler::Result<()> {
//!     let engine = ChainEngine::open("babbler.state.db", EngineConfig::default()).await?;
//!
//!     engine.ingest("the quick brown fox").await?;
//!     let generated = engine.generate(25, "tell me about the fox").await?;
//!     println!("{} ({:?})", generated.text, generated.elapsed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod stats;

pub use config::EngineConfig;
pub use engine::{ChainEngine, EngineStats, Generated};
pub use error::{EngineError, Result};
pub use stats::spawn_stats_reporter;

pub use babbler_core::{seed_key, tokenize, Prefix, TransitionRecord};
pub use babbler_store::{
    ChainStore, MemoryStore, MigrationOutcome, SqliteStore, StoreError,
};
