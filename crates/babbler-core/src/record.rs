//! Deduplicated successor lists.

use serde::{Deserialize, Serialize};

/// The words observed to follow one prefix, each at most once, in
/// first-occurrence order.
///
/// Successor choice during generation is uniform, so the order carries no
/// weighting; it still must survive storage round trips unchanged.
/// Deduplication keeps records bounded by vocabulary rather than by corpus
/// size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionRecord {
    words: Vec<String>,
}

impl TransitionRecord {
    /// An empty record: the result of looking up an unseen prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a word sequence, dropping repeats.
    pub fn from_words<I>(words: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut record = Self::new();
        for word in words {
            record.insert(word.as_ref());
        }
        record
    }

    /// Append `word` unless it is already present. Returns whether the
    /// record changed.
    pub fn insert(&mut self, word: &str) -> bool {
        if self.words.iter().any(|w| w == word) {
            return false;
        }
        self.words.push(word.to_string());
        true
    }

    /// The recorded successors, oldest first.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
