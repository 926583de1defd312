//! Repository abstractions over the frequency store and ingestion tracker
//!
//! The ingestor receives both repositories by injection rather than opening
//! implicit global database paths, so tests can substitute the in-memory
//! implementations defined here for the SQLite-backed ones in
//! [`crate::database`].

use crate::errors::Result;
use crate::tagger::CategoryTagger;
use crate::types::{MergeReport, TokenBatch, WordRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable word -> (count, category, timestamps) mapping.
///
/// `merge` is purely additive and performs no deduplication against history;
/// exactly-once application per file is the caller's contract, upheld via
/// [`ProcessedFileRepository`]. All query operations are read-only and
/// return zero-valued aggregates or empty sequences on an empty store.
#[async_trait]
pub trait WordFrequencyRepository: Send + Sync {
    /// Additively apply one file's token counts.
    ///
    /// Existing words get `count += c` and a fresh update timestamp; their
    /// category is left untouched. New words are tagged exactly once and
    /// inserted. The whole batch applies as a single atomic unit.
    async fn merge(&self, batch: &TokenBatch, tagger: &dyn CategoryTagger) -> Result<MergeReport>;

    /// Number of distinct words in the store
    async fn distinct_words(&self) -> Result<u64>;

    /// Sum of all counts (0 if the store is empty)
    async fn total_occurrences(&self) -> Result<u64>;

    /// Top words ordered by count descending, ties broken by word ascending
    async fn rank(&self, limit: u32) -> Result<Vec<(String, u64)>>;

    /// Full record for one word, or None if it was never observed
    async fn lookup(&self, word: &str) -> Result<Option<WordRecord>>;

    /// Records whose category label contains `pattern` as a substring
    async fn filter_by_category(&self, pattern: &str) -> Result<Vec<WordRecord>>;

    /// Ranked records with an optional row limit and category filter,
    /// ordered the same way as `rank`
    async fn ranked_records(
        &self,
        limit: Option<u32>,
        category_pattern: Option<&str>,
    ) -> Result<Vec<WordRecord>>;

    /// Sum of counts among records matching the category filter
    /// (the grand total when no filter is given)
    async fn category_total(&self, category_pattern: Option<&str>) -> Result<u64>;
}

/// Durable set of already-ingested file identities, keyed by canonical path.
///
/// The sole mechanism enforcing that each file contributes its counts at
/// most once across interrupted and repeated batch runs.
#[async_trait]
pub trait ProcessedFileRepository: Send + Sync {
    async fn is_processed(&self, path: &Path) -> Result<bool>;

    /// Record a file as ingested. Idempotent: marking an already-marked
    /// path is a no-op, not an error.
    async fn mark_processed(&self, path: &Path) -> Result<()>;
}

fn category_matches(category: &str, pattern: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(p) => category
            .to_ascii_lowercase()
            .contains(&p.to_ascii_lowercase()),
    }
}

fn rank_order(a: &WordRecord, b: &WordRecord) -> std::cmp::Ordering {
    b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word))
}

/// In-memory frequency store for tests
#[derive(Debug, Default)]
pub struct MemoryWordStore {
    records: Mutex<HashMap<String, WordRecord>>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_records(&self, category_pattern: Option<&str>) -> Vec<WordRecord> {
        let records = self.records.lock().expect("word store lock poisoned");
        let mut matching: Vec<WordRecord> = records
            .values()
            .filter(|r| category_matches(&r.category, category_pattern))
            .cloned()
            .collect();
        matching.sort_by(rank_order);
        matching
    }
}

#[async_trait]
impl WordFrequencyRepository for MemoryWordStore {
    async fn merge(&self, batch: &TokenBatch, tagger: &dyn CategoryTagger) -> Result<MergeReport> {
        let mut records = self.records.lock().expect("word store lock poisoned");
        let mut report = MergeReport::default();
        let now = Utc::now();

        for (word, count) in batch.iter() {
            match records.get_mut(word) {
                Some(record) => {
                    record.count += count;
                    record.updated_at = now;
                    report.updated_words += 1;
                }
                None => {
                    let category = tagger.tag(word);
                    records.insert(
                        word.to_string(),
                        WordRecord {
                            word: word.to_string(),
                            count,
                            category,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                    report.new_words += 1;
                }
            }
        }

        Ok(report)
    }

    async fn distinct_words(&self) -> Result<u64> {
        let records = self.records.lock().expect("word store lock poisoned");
        Ok(records.len() as u64)
    }

    async fn total_occurrences(&self) -> Result<u64> {
        let records = self.records.lock().expect("word store lock poisoned");
        Ok(records.values().map(|r| r.count).sum())
    }

    async fn rank(&self, limit: u32) -> Result<Vec<(String, u64)>> {
        Ok(self
            .sorted_records(None)
            .into_iter()
            .take(limit as usize)
            .map(|r| (r.word, r.count))
            .collect())
    }

    async fn lookup(&self, word: &str) -> Result<Option<WordRecord>> {
        let records = self.records.lock().expect("word store lock poisoned");
        Ok(records.get(word).cloned())
    }

    async fn filter_by_category(&self, pattern: &str) -> Result<Vec<WordRecord>> {
        Ok(self.sorted_records(Some(pattern)))
    }

    async fn ranked_records(
        &self,
        limit: Option<u32>,
        category_pattern: Option<&str>,
    ) -> Result<Vec<WordRecord>> {
        let mut matching = self.sorted_records(category_pattern);
        if let Some(limit) = limit {
            matching.truncate(limit as usize);
        }
        Ok(matching)
    }

    async fn category_total(&self, category_pattern: Option<&str>) -> Result<u64> {
        let records = self.records.lock().expect("word store lock poisoned");
        Ok(records
            .values()
            .filter(|r| category_matches(&r.category, category_pattern))
            .map(|r| r.count)
            .sum())
    }
}

/// In-memory processed-file tracker for tests
#[derive(Debug, Default)]
pub struct MemoryFileTracker {
    paths: Mutex<HashSet<PathBuf>>,
}

impl MemoryFileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed_count(&self) -> usize {
        self.paths.lock().expect("tracker lock poisoned").len()
    }
}

#[async_trait]
impl ProcessedFileRepository for MemoryFileTracker {
    async fn is_processed(&self, path: &Path) -> Result<bool> {
        let paths = self.paths.lock().expect("tracker lock poisoned");
        Ok(paths.contains(path))
    }

    async fn mark_processed(&self, path: &Path) -> Result<()> {
        let mut paths = self.paths.lock().expect("tracker lock poisoned");
        paths.insert(path.to_path_buf());
        Ok(())
    }
}
