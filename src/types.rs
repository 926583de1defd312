//! Core data types and structures for the word-ingest CLI tool

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Durable frequency record for one normalized word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// Normalized word form (lowercase, ASCII alphabetic); unique in the store
    pub word: String,
    /// Cumulative occurrence count across all ingested files; only ever grows
    pub count: u64,
    /// Grammatical category label, assigned once on first observation
    pub category: String,
    /// When the word was first recorded
    pub created_at: DateTime<Utc>,
    /// When the word was last touched by a merge
    pub updated_at: DateTime<Utc>,
}

/// Per-file multiset of normalized words with their in-document counts.
///
/// Built from tokenizer output for a single file and discarded after the
/// merge; it carries no memory of other files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBatch {
    counts: HashMap<String, u64>,
}

impl TokenBatch {
    /// Aggregate a token sequence into per-word counts
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct words in the batch
    pub fn distinct_words(&self) -> usize {
        self.counts.len()
    }

    /// Total token occurrences in the batch
    pub fn total_tokens(&self) -> u64 {
        self.counts.values().sum()
    }

    /// In-batch count for one word (0 if absent)
    pub fn count_of(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }
}

/// Outcome of merging one token batch into the frequency store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Words inserted for the first time by this merge
    pub new_words: u64,
    /// Words whose count was incremented by this merge
    pub updated_words: u64,
}

/// Outcome of processing a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Path the file was read from
    pub path: PathBuf,
    /// Name of the encoding the bytes were decoded with
    pub encoding: String,
    /// Distinct words found in the file
    pub distinct_words: usize,
    /// Total word occurrences found in the file
    pub total_tokens: u64,
    /// Store-side merge outcome
    pub merge: MergeReport,
}

/// A file that failed during a batch run and was left untracked for retry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Error message
    pub cause: String,
}

/// Summary of one directory ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Matching files discovered under the root
    pub total_found: usize,
    /// Files skipped because a previous run already ingested them
    pub already_processed: usize,
    /// Files ingested and marked during this run
    pub newly_processed: usize,
    /// Files that errored; not marked, eligible for retry on a later run
    pub failed: Vec<FailedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_batch_aggregates_counts() {
        let batch = TokenBatch::from_tokens(
            ["the", "cat", "the"].into_iter().map(String::from),
        );

        assert_eq!(batch.distinct_words(), 2);
        assert_eq!(batch.total_tokens(), 3);
        assert_eq!(batch.count_of("the"), 2);
        assert_eq!(batch.count_of("cat"), 1);
        assert_eq!(batch.count_of("dog"), 0);
    }

    #[test]
    fn test_token_batch_empty() {
        let batch = TokenBatch::from_tokens(std::iter::empty());

        assert!(batch.is_empty());
        assert_eq!(batch.distinct_words(), 0);
        assert_eq!(batch.total_tokens(), 0);
    }
}
