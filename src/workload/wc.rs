//! A MapReduce-compatible implementation of word count.
//!

use crate::utils::{sum, tokens_with_unit_count};
use crate::{KeyValue, Mapper, Reducer};

/// Emits `(word, 1)` for every whitespace-delimited word and sums the
/// counts of each word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

impl Mapper for WordCount {
    fn map(&self, _unit: &str, content: &str) -> Vec<KeyValue> {
        tokens_with_unit_count(content)
    }
}

impl Reducer for WordCount {
    fn reduce(&self, _word: &str, counts: &[u64]) -> u64 {
        sum(counts)
    }
}
