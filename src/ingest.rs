//! Batch ingestion: directory walking, per-file processing, resumable tracking

use crate::encoding::decode_bytes;
use crate::errors::{ErrorContext, Result, WordIngestError};
use crate::repository::{ProcessedFileRepository, WordFrequencyRepository};
use crate::tagger::CategoryTagger;
use crate::tokenizer::tokenize;
use crate::types::{FailedFile, FileReport, IngestSummary, TokenBatch};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension of ingestible plain-text files
pub const TEXT_EXTENSION: &str = "txt";

/// Drives per-file ingestion and resumable directory batches.
///
/// Both repositories and the tagger are injected; the ingestor owns no
/// storage of its own.
pub struct Ingestor {
    words: Arc<dyn WordFrequencyRepository>,
    tracker: Arc<dyn ProcessedFileRepository>,
    tagger: Arc<dyn CategoryTagger>,
}

impl Ingestor {
    pub fn new(
        words: Arc<dyn WordFrequencyRepository>,
        tracker: Arc<dyn ProcessedFileRepository>,
        tagger: Arc<dyn CategoryTagger>,
    ) -> Self {
        Self {
            words,
            tracker,
            tagger,
        }
    }

    /// Process one file: read, decode (best-effort), tokenize, merge.
    ///
    /// Does not consult or update the processed-file tracker; repeated calls
    /// add the file's counts again. A file with no English words merges an
    /// empty batch and still succeeds.
    pub async fn ingest_file(&self, path: &Path) -> Result<FileReport> {
        if !path.exists() {
            return Err(WordIngestError::InputPath {
                path: path.to_path_buf(),
                cause: "file not found".to_string(),
            });
        }

        let bytes = tokio::fs::read(path).await.with_file_context(path)?;
        let (text, encoding) = decode_bytes(&bytes);
        let batch = TokenBatch::from_tokens(tokenize(&text));
        let merge = self.words.merge(&batch, self.tagger.as_ref()).await?;

        debug!(
            path = %path.display(),
            encoding,
            distinct = batch.distinct_words(),
            total = batch.total_tokens(),
            "merged file"
        );

        Ok(FileReport {
            path: path.to_path_buf(),
            encoding: encoding.to_string(),
            distinct_words: batch.distinct_words(),
            total_tokens: batch.total_tokens(),
            merge,
        })
    }

    /// Recursively ingest every `.txt` file under `root`, skipping files a
    /// previous run already processed.
    ///
    /// Files are keyed by canonical path. Each successfully merged file is
    /// marked in the tracker immediately afterwards, so an interrupted run
    /// resumes without re-counting. Per-file errors are recorded in the
    /// summary and the file is left untracked for retry; storage failures
    /// abort the batch.
    pub async fn ingest_directory(&self, root: &Path) -> Result<IngestSummary> {
        if !root.exists() {
            return Err(WordIngestError::InputPath {
                path: root.to_path_buf(),
                cause: "directory not found".to_string(),
            });
        }
        if !root.is_dir() {
            return Err(WordIngestError::InputPath {
                path: root.to_path_buf(),
                cause: "not a directory".to_string(),
            });
        }

        let candidates = discover_text_files(root);
        let mut summary = IngestSummary {
            total_found: candidates.len(),
            ..IngestSummary::default()
        };

        let mut pending = Vec::new();
        for path in candidates {
            let canonical = match path.canonicalize() {
                Ok(canonical) => canonical,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot canonicalize, skipping");
                    summary.failed.push(FailedFile {
                        path,
                        cause: e.to_string(),
                    });
                    continue;
                }
            };
            if self.tracker.is_processed(&canonical).await? {
                summary.already_processed += 1;
            } else {
                pending.push(canonical);
            }
        }

        info!(
            total = summary.total_found,
            already_processed = summary.already_processed,
            pending = pending.len(),
            "starting directory ingestion"
        );

        let pending_total = pending.len();
        for (index, path) in pending.into_iter().enumerate() {
            info!("processing ({}/{}): {}", index + 1, pending_total, path.display());
            match self.ingest_file(&path).await {
                Ok(report) => {
                    self.tracker.mark_processed(&path).await?;
                    summary.newly_processed += 1;
                    debug!(
                        new_words = report.merge.new_words,
                        updated_words = report.merge.updated_words,
                        "file marked processed"
                    );
                }
                Err(err) if err.is_storage() => return Err(err),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "file skipped, eligible for retry");
                    summary.failed.push(FailedFile {
                        path,
                        cause: err.to_string(),
                    });
                }
            }
        }

        info!(
            newly_processed = summary.newly_processed,
            failed = summary.failed.len(),
            "directory ingestion complete"
        );

        Ok(summary)
    }
}

/// Discover `.txt` files under `root` in a deterministic order.
///
/// Traversal errors (unreadable subdirectories) are logged and skipped so a
/// bad corner of the tree never aborts the batch.
fn discover_text_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "traversal error, skipping entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let is_text = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(TEXT_EXTENSION))
            .unwrap_or(false);
        if is_text {
            files.push(entry.path().to_path_buf());
        }
    }

    files
}
