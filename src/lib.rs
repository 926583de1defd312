//! Word-ingest - a CLI tool for building a durable English word-frequency
//! table from plain-text files
//!
//! This library provides the core functionality for resolving file encodings,
//! extracting normalized word tokens, merging per-file counts into a durable
//! frequency store, and tracking which files have already contributed so that
//! batch runs over a directory tree are resumable and count each file once.

pub mod cli;
pub mod database;
pub mod encoding;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod repository;
pub mod tagger;
pub mod tokenizer;
pub mod types;

// Re-export commonly used types
pub use errors::{Result, WordIngestError};
pub use types::{IngestSummary, MergeReport, TokenBatch, WordRecord};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        errors::{Result, WordIngestError},
        types::{FailedFile, FileReport, IngestSummary, MergeReport, TokenBatch, WordRecord},
    };
}
