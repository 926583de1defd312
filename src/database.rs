//! Database operations and schema management
//!
//! One SQLite file holds both durable tables: `words` (the frequency store)
//! and `processed_files` (the ingestion tracker). The two are logically
//! independent and only meet behind their repository traits.

use crate::errors::Result;
use crate::repository::{ProcessedFileRepository, WordFrequencyRepository};
use crate::tagger::CategoryTagger;
use crate::types::{MergeReport, TokenBatch, WordRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::time::Duration;

/// Database manager for SQLite operations with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection with pool settings sized for CLI usage
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let database_url = format!("sqlite://{}?mode=rwc", database_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&database_url)
            .await?;

        let db = Self { pool };
        db.configure_sqlite().await?;
        Ok(db)
    }

    /// Configure SQLite for crash safety under a single writer
    async fn configure_sqlite(&self) -> Result<()> {
        // WAL keeps a mid-run crash from corrupting committed merges
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Initialize database schema; safe to call on every startup
    pub async fn initialize_schema(&self) -> Result<()> {
        self.create_schema_version_table().await?;
        self.create_words_table().await?;
        self.create_processed_files_table().await?;
        self.create_indexes().await?;
        Ok(())
    }

    async fn create_schema_version_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                description TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            sqlx::query(
                "INSERT INTO schema_version (version, description) VALUES (1, 'Initial schema')",
            )
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Create the word frequency table
    async fn create_words_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS words (
                word TEXT PRIMARY KEY,
                count INTEGER NOT NULL CHECK(count > 0),
                category TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the processed-files tracking table
    async fn create_processed_files_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS processed_files (
                file_path TEXT PRIMARY KEY,
                processed_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create indexes for the common query patterns
    async fn create_indexes(&self) -> Result<()> {
        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_words_count ON words(count DESC, word ASC)",
            "CREATE INDEX IF NOT EXISTS idx_words_category ON words(category)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Frequency store handle backed by this database
    pub fn words(&self) -> SqliteWordStore {
        SqliteWordStore {
            pool: self.pool.clone(),
        }
    }

    /// Ingestion tracker handle backed by this database
    pub fn processed_files(&self) -> SqliteFileTracker {
        SqliteFileTracker {
            pool: self.pool.clone(),
        }
    }

    /// Check if database connection is healthy
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Close database connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Reference to the connection pool for advanced operations
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// SQLite-backed word frequency store
#[derive(Clone)]
pub struct SqliteWordStore {
    pool: SqlitePool,
}

fn word_from_row(row: &SqliteRow) -> std::result::Result<WordRecord, sqlx::Error> {
    Ok(WordRecord {
        word: row.try_get("word")?,
        count: row.try_get::<i64, _>("count")? as u64,
        category: row.try_get("category")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl WordFrequencyRepository for SqliteWordStore {
    async fn merge(&self, batch: &TokenBatch, tagger: &dyn CategoryTagger) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        if batch.is_empty() {
            return Ok(report);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (word, count) in batch.iter() {
            let existing: Option<i64> = sqlx::query_scalar("SELECT count FROM words WHERE word = ?")
                .bind(word)
                .fetch_optional(&mut *tx)
                .await?;

            match existing {
                Some(current) => {
                    sqlx::query("UPDATE words SET count = ?, updated_at = ? WHERE word = ?")
                        .bind(current + count as i64)
                        .bind(now)
                        .bind(word)
                        .execute(&mut *tx)
                        .await?;
                    report.updated_words += 1;
                }
                None => {
                    // Tag exactly once, on first observation; the label is permanent
                    let category = tagger.tag(word);
                    sqlx::query(
                        r#"
                        INSERT INTO words (word, count, category, created_at, updated_at)
                        VALUES (?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(word)
                    .bind(count as i64)
                    .bind(category)
                    .bind(now)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                    report.new_words += 1;
                }
            }
        }

        tx.commit().await?;
        Ok(report)
    }

    async fn distinct_words(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn total_occurrences(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(count), 0) FROM words")
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }

    async fn rank(&self, limit: u32) -> Result<Vec<(String, u64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT word, count FROM words ORDER BY count DESC, word ASC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(word, count)| (word, count as u64))
            .collect())
    }

    async fn lookup(&self, word: &str) -> Result<Option<WordRecord>> {
        let row = sqlx::query(
            "SELECT word, count, category, created_at, updated_at FROM words WHERE word = ?",
        )
        .bind(word)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(word_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn filter_by_category(&self, pattern: &str) -> Result<Vec<WordRecord>> {
        self.ranked_records(None, Some(pattern)).await
    }

    async fn ranked_records(
        &self,
        limit: Option<u32>,
        category_pattern: Option<&str>,
    ) -> Result<Vec<WordRecord>> {
        let like = category_pattern
            .map(|p| format!("%{}%", p))
            .unwrap_or_else(|| "%".to_string());
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = sqlx::query(
            r#"
            SELECT word, count, category, created_at, updated_at
            FROM words
            WHERE category LIKE ?
            ORDER BY count DESC, word ASC
            LIMIT ?
            "#,
        )
        .bind(like)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(word_from_row(row)?);
        }
        Ok(records)
    }

    async fn category_total(&self, category_pattern: Option<&str>) -> Result<u64> {
        let like = category_pattern
            .map(|p| format!("%{}%", p))
            .unwrap_or_else(|| "%".to_string());

        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(count), 0) FROM words WHERE category LIKE ?")
                .bind(like)
                .fetch_one(&self.pool)
                .await?;
        Ok(total as u64)
    }
}

/// SQLite-backed processed-file tracker
#[derive(Clone)]
pub struct SqliteFileTracker {
    pool: SqlitePool,
}

#[async_trait]
impl ProcessedFileRepository for SqliteFileTracker {
    async fn is_processed(&self, path: &Path) -> Result<bool> {
        let path_str = path.to_string_lossy().to_string();

        let row: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM processed_files WHERE file_path = ?")
                .bind(path_str)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    async fn mark_processed(&self, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy().to_string();

        sqlx::query("INSERT OR IGNORE INTO processed_files (file_path, processed_at) VALUES (?, ?)")
            .bind(path_str)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::HeuristicTagger;
    use crate::tokenizer::tokenize;
    use tempfile::NamedTempFile;

    async fn create_test_database() -> (Database, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Database::new(temp_file.path()).await.unwrap();
        db.initialize_schema().await.unwrap();
        (db, temp_file)
    }

    #[tokio::test]
    async fn test_database_creation_and_schema() {
        let (db, _temp_file) = create_test_database().await;

        db.health_check().await.unwrap();

        for table in ["words", "processed_files", "schema_version"] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?",
            )
            .bind(table)
            .fetch_one(db.pool())
            .await
            .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }

        // Schema init is idempotent
        db.initialize_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_wal_mode_enabled() {
        let (db, _temp_file) = create_test_database().await;

        let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(journal_mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_merge_inserts_and_updates() {
        let (db, _temp_file) = create_test_database().await;
        let store = db.words();
        let tagger = HeuristicTagger::new();

        let first = store
            .merge(&TokenBatch::from_tokens(tokenize("the cat and the dog")), &tagger)
            .await
            .unwrap();
        assert_eq!(first.new_words, 4);
        assert_eq!(first.updated_words, 0);

        let second = store
            .merge(&TokenBatch::from_tokens(tokenize("the cat runs")), &tagger)
            .await
            .unwrap();
        assert_eq!(second.new_words, 1);
        assert_eq!(second.updated_words, 2);

        let the = store.lookup("the").await.unwrap().unwrap();
        assert_eq!(the.count, 3);
        assert_eq!(the.category, "DT");

        assert_eq!(store.distinct_words().await.unwrap(), 5);
        assert_eq!(store.total_occurrences().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_category_is_immutable_across_merges() {
        let (db, _temp_file) = create_test_database().await;
        let store = db.words();
        let tagger = HeuristicTagger::new();

        store
            .merge(&TokenBatch::from_tokens(tokenize("running")), &tagger)
            .await
            .unwrap();
        let first = store.lookup("running").await.unwrap().unwrap();

        store
            .merge(&TokenBatch::from_tokens(tokenize("running running")), &tagger)
            .await
            .unwrap();
        let second = store.lookup("running").await.unwrap().unwrap();

        assert_eq!(second.category, first.category);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.count, 3);
    }

    #[tokio::test]
    async fn test_rank_orders_by_count_then_word() {
        let (db, _temp_file) = create_test_database().await;
        let store = db.words();
        let tagger = HeuristicTagger::new();

        store
            .merge(
                &TokenBatch::from_tokens(tokenize("cat cat cat cat cat bat bat bat bat bat dog dog dog")),
                &tagger,
            )
            .await
            .unwrap();

        let ranked = store.rank(3).await.unwrap();
        assert_eq!(
            ranked,
            vec![
                ("bat".to_string(), 5),
                ("cat".to_string(), 5),
                ("dog".to_string(), 3)
            ]
        );

        let top_one = store.rank(1).await.unwrap();
        assert_eq!(top_one, vec![("bat".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_lookup_missing_word_returns_none() {
        let (db, _temp_file) = create_test_database().await;
        let store = db.words();

        assert!(store.lookup("ghost").await.unwrap().is_none());
        assert_eq!(store.distinct_words().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_store_aggregates_are_zero() {
        let (db, _temp_file) = create_test_database().await;
        let store = db.words();

        assert_eq!(store.total_occurrences().await.unwrap(), 0);
        assert!(store.rank(10).await.unwrap().is_empty());
        assert!(store.ranked_records(None, None).await.unwrap().is_empty());
        assert_eq!(store.category_total(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_category_filter_and_totals() {
        let (db, _temp_file) = create_test_database().await;
        let store = db.words();
        let tagger = HeuristicTagger::new();

        // the -> DT, cat/dog -> NN, running -> VBG
        store
            .merge(&TokenBatch::from_tokens(tokenize("the cat dog running running")), &tagger)
            .await
            .unwrap();

        let nouns = store.filter_by_category("NN").await.unwrap();
        let noun_words: Vec<&str> = nouns.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(noun_words, vec!["cat", "dog"]);

        assert_eq!(store.category_total(Some("NN")).await.unwrap(), 2);
        assert_eq!(store.category_total(Some("VBG")).await.unwrap(), 2);
        assert_eq!(store.category_total(None).await.unwrap(), 5);

        let limited = store.ranked_records(Some(1), Some("NN")).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].word, "cat");
    }

    #[tokio::test]
    async fn test_mark_processed_is_idempotent_and_durable() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = Path::new("/books/moby.txt");

        {
            let db = Database::new(temp_file.path()).await.unwrap();
            db.initialize_schema().await.unwrap();
            let tracker = db.processed_files();

            assert!(!tracker.is_processed(path).await.unwrap());
            tracker.mark_processed(path).await.unwrap();
            tracker.mark_processed(path).await.unwrap();
            assert!(tracker.is_processed(path).await.unwrap());

            let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM processed_files")
                .fetch_one(db.pool())
                .await
                .unwrap();
            assert_eq!(rows, 1);

            db.close().await;
        }

        // Markers survive a reopen
        let db = Database::new(temp_file.path()).await.unwrap();
        db.initialize_schema().await.unwrap();
        let tracker = db.processed_files();
        assert!(tracker.is_processed(path).await.unwrap());
    }
}
