//! Error types and handling for the word-ingest CLI tool

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the word-ingest application
pub type Result<T> = std::result::Result<T, WordIngestError>;

/// Error hierarchy for all failure modes
#[derive(Error, Debug)]
pub enum WordIngestError {
    /// I/O related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File processing errors
    #[error("File processing error: {file_path} - {cause}")]
    FileProcessing { file_path: PathBuf, cause: String },

    /// Input path resolution errors (missing file or directory)
    #[error("Input path error: {path} - {cause}")]
    InputPath { path: PathBuf, cause: String },

    /// CLI argument errors
    #[error("CLI argument error: {0}")]
    CliArgument(String),
}

impl WordIngestError {
    /// Whether this error indicates an unrecoverable storage failure.
    ///
    /// Storage failures abort the current operation; every other per-file
    /// error is recorded and the batch continues.
    pub fn is_storage(&self) -> bool {
        matches!(self, WordIngestError::Database(_))
    }
}

/// Helper trait for adding file context to errors
pub trait ErrorContext<T> {
    /// Convert an error into a file processing error for the given path
    fn with_file_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_file_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| WordIngestError::FileProcessing {
            file_path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }
}
