//! Periodic stats reporting.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use babbler_store::ChainStore;

use crate::engine::ChainEngine;

/// Spawn a task that logs the engine's record count once per `period`.
///
/// The first report fires after one full period. Abort the returned handle
/// to stop reporting.
pub fn spawn_stats_reporter<S>(engine: Arc<ChainEngine<S>>, period: Duration) -> JoinHandle<()>
where
    S: ChainStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // interval() fires immediately; consume that tick so the first
        // report lands a full period after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match engine.stats().await {
                Ok(stats) => info!(records = stats.record_count, "chain stats"),
                Err(err) => warn!(error = %err, "stats read failed"),
            }
        }
    })
}
