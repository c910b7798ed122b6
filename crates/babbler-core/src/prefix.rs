//! The sliding prefix window and its key encodings.
//!
//! A [`Prefix`] is the fixed-width window of the most recent words, used as
//! the lookup key for the transition table. Keys are the space-joined window
//! contents; a window that has seen no words yet serializes to the
//! distinguished start-of-chain key (its empty slots joined by spaces).

use std::fmt;

/// Fixed-width window of the most recent words.
///
/// Sliding the window drops the oldest word and appends the newest. The
/// width is fixed when a store is created; reading a store with a different
/// width produces keys that match nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    words: Vec<String>,
}

impl Prefix {
    /// A window of `len` empty slots: the start-of-chain state.
    pub fn empty(len: usize) -> Self {
        Self {
            words: vec![String::new(); len],
        }
    }

    /// The store key for the current window contents.
    pub fn key(&self) -> String {
        self.words.join(" ")
    }

    /// Slide the window: drop the oldest word, append `word`.
    pub fn shift(&mut self, word: &str) {
        if self.words.is_empty() {
            return;
        }
        self.words.rotate_left(1);
        if let Some(last) = self.words.last_mut() {
            last.clear();
            last.push_str(word);
        }
    }

    /// Window width in words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True for a zero-width window.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Lookup key for the seed index: one word behind a single leading space.
///
/// A chain's first word is recorded under the start window with only its
/// final slot filled, which for the default two-word window serializes to
/// `" {word}"`. Seed scanning probes exactly this shape regardless of the
/// configured width; it is narrower than a full prefix key and must stay
/// byte-compatible with existing stores.
pub fn seed_key(word: &str) -> String {
    format!(" {word}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_key_is_empty_slots_joined() {
        assert_eq!(Prefix::empty(2).key(), " ");
        assert_eq!(Prefix::empty(3).key(), "  ");
        assert_eq!(Prefix::empty(1).key(), "");
    }

    #[test]
    fn test_shift_slides_window() {
        let mut p = Prefix::empty(2);
        p.shift("the");
        assert_eq!(p.key(), " the");
        p.shift("quick");
        assert_eq!(p.key(), "the quick");
        p.shift("fox");
        assert_eq!(p.key(), "quick fox");
    }

    #[test]
    fn test_shift_zero_width_is_noop() {
        let mut p = Prefix::empty(0);
        p.shift("word");
        assert_eq!(p.key(), "");
    }

    #[test]
    fn test_seed_key_shape() {
        assert_eq!(seed_key("fox"), " fox");
        // Matches the key a two-word window produces after its first shift.
        let mut p = Prefix::empty(2);
        p.shift("fox");
        assert_eq!(p.key(), seed_key("fox"));
    }
}
