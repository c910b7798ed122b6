//! Engine configuration.

/// Configuration for the chain engine.
///
/// These are plain constructor parameters; parsing flags or environment
/// variables belongs to the caller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Width of the prefix window in words.
    ///
    /// Fixed at store-creation time. Opening an existing store with a
    /// different width is undefined behavior: keys written under one width
    /// are unreachable under another.
    pub prefix_len: usize,

    /// Word cap used by [`reply`](crate::ChainEngine::reply).
    pub max_words: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefix_len: 2,
            max_words: 25,
        }
    }
}
