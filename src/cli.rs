//! Command-line interface for the word-ingest tool
//!
//! Presentation layer only: argument parsing, validation, and human-readable
//! output over the core operations.

use crate::database::Database;
use crate::errors::{Result, WordIngestError};
use crate::export;
use crate::ingest::Ingestor;
use crate::repository::{ProcessedFileRepository, WordFrequencyRepository};
use crate::tagger::HeuristicTagger;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// word-ingest - build a durable English word-frequency table from plain-text files
#[derive(Parser, Debug)]
#[command(name = "word-ingest")]
#[command(about = "Ingest plain-text files into a durable English word-frequency database")]
#[command(version)]
pub struct Cli {
    /// SQLite database file path
    #[arg(short, long, value_name = "FILE", default_value = "words.db")]
    pub database: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Ingest one text file (unconditionally; no processed-file tracking)
    File {
        /// Path to the text file
        path: PathBuf,
    },
    /// Recursively ingest every .txt file under a directory (resumable)
    Dir {
        /// Root directory to scan
        path: PathBuf,
    },
    /// Show ranked word statistics
    Stats {
        /// Maximum number of rows to display
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Look up a single word
    Lookup {
        /// Word to look up (normalized to lowercase)
        word: String,
    },
    /// Export ranked words to a tab-delimited file
    Export {
        /// Output file path
        #[arg(short, long, value_name = "FILE", default_value = "words_export.txt")]
        output: PathBuf,

        /// Limit to the N most frequent words
        #[arg(short, long)]
        limit: Option<u32>,

        /// Category substring filter (e.g. NN, VB, JJ)
        #[arg(short, long)]
        category: Option<String>,
    },
}

impl Cli {
    /// Parse CLI arguments from the command line
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Run the CLI application
    pub async fn run(self) -> Result<()> {
        let Some(command) = self.command.clone() else {
            print_usage();
            return Ok(());
        };

        self.validate_args()?;

        let database = Database::new(&self.database).await?;
        database.initialize_schema().await?;
        let words: Arc<dyn WordFrequencyRepository> = Arc::new(database.words());
        let tracker: Arc<dyn ProcessedFileRepository> = Arc::new(database.processed_files());

        match command {
            Commands::File { path } => self.run_file(words, tracker, path).await,
            Commands::Dir { path } => self.run_dir(words, tracker, path).await,
            Commands::Stats { limit } => self.run_stats(words, limit).await,
            Commands::Lookup { word } => self.run_lookup(words, word).await,
            Commands::Export {
                output,
                limit,
                category,
            } => self.run_export(words, output, limit, category).await,
        }
    }

    /// Validate arguments before any state is touched
    fn validate_args(&self) -> Result<()> {
        let db_parent = match self.database.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().map_err(|e| {
                WordIngestError::CliArgument(format!("Cannot access current directory: {}", e))
            })?,
        };

        if !db_parent.exists() {
            return Err(WordIngestError::CliArgument(format!(
                "Database directory does not exist: {}",
                db_parent.display()
            )));
        }

        Ok(())
    }

    fn ingestor(
        &self,
        words: Arc<dyn WordFrequencyRepository>,
        tracker: Arc<dyn ProcessedFileRepository>,
    ) -> Ingestor {
        Ingestor::new(words, tracker, Arc::new(HeuristicTagger::new()))
    }

    async fn run_file(
        &self,
        words: Arc<dyn WordFrequencyRepository>,
        tracker: Arc<dyn ProcessedFileRepository>,
        path: PathBuf,
    ) -> Result<()> {
        let ingestor = self.ingestor(words, tracker);
        let report = ingestor.ingest_file(&path).await?;

        if self.verbose {
            println!("Decoded {} as {}", report.path.display(), report.encoding);
        }
        println!(
            "Processed {}: {} distinct words, {} total occurrences ({} new, {} updated)",
            report.path.display(),
            report.distinct_words,
            report.total_tokens,
            report.merge.new_words,
            report.merge.updated_words
        );
        Ok(())
    }

    async fn run_dir(
        &self,
        words: Arc<dyn WordFrequencyRepository>,
        tracker: Arc<dyn ProcessedFileRepository>,
        path: PathBuf,
    ) -> Result<()> {
        let ingestor = self.ingestor(words, tracker);
        let summary = ingestor.ingest_directory(&path).await?;

        println!("Found {} .txt files", summary.total_found);
        println!("Already processed: {}", summary.already_processed);
        println!("Newly processed:   {}", summary.newly_processed);
        if !summary.failed.is_empty() {
            println!("Failed (will retry on next run):");
            for failed in &summary.failed {
                println!("  {} - {}", failed.path.display(), failed.cause);
            }
        }
        Ok(())
    }

    async fn run_stats(&self, words: Arc<dyn WordFrequencyRepository>, limit: u32) -> Result<()> {
        let distinct = words.distinct_words().await?;
        let total = words.total_occurrences().await?;
        let ranked = words.rank(limit).await?;

        println!("=== Word statistics ===");
        println!("Distinct words:    {}", distinct);
        println!("Total occurrences: {}", total);

        if !ranked.is_empty() {
            println!();
            println!("=== Top {} words ===", ranked.len());
            println!("{:<20} {:<10} {:<10}", "word", "count", "percent");
            println!("{}", "-".repeat(40));
            for (word, count) in &ranked {
                let percent = if total > 0 {
                    *count as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                println!("{:<20} {:<10} {:.1}%", word, count, percent);
            }
        }
        Ok(())
    }

    async fn run_lookup(&self, words: Arc<dyn WordFrequencyRepository>, word: String) -> Result<()> {
        let normalized = word.to_lowercase();
        match words.lookup(&normalized).await? {
            Some(record) => {
                println!("Word:           {}", record.word);
                println!("Count:          {}", record.count);
                println!("Category:       {}", record.category);
                println!("First recorded: {}", record.created_at);
                println!("Last updated:   {}", record.updated_at);
            }
            None => {
                println!("Word not found: {}", normalized);
            }
        }
        Ok(())
    }

    async fn run_export(
        &self,
        words: Arc<dyn WordFrequencyRepository>,
        output: PathBuf,
        limit: Option<u32>,
        category: Option<String>,
    ) -> Result<()> {
        let report =
            export::export_to_path(words.as_ref(), &output, limit, category.as_deref()).await?;

        println!("Exported {} words to {}", report.rows, output.display());
        if let Some(category) = &category {
            println!("Category filter: {}", category);
        }
        println!("Category percentage sum: {:.2}%", report.category_pct_sum);
        println!("Overall percentage sum:  {:.2}%", report.overall_pct_sum);
        Ok(())
    }
}

fn print_usage() {
    println!("word-ingest - English word frequency tracker");
    println!("Usage examples:");
    println!("  word-ingest file book.txt               # ingest one text file");
    println!("  word-ingest dir ./books                 # ingest a directory (resumable)");
    println!("  word-ingest stats --limit 50            # show ranked statistics");
    println!("  word-ingest lookup hello                # look up one word");
    println!("  word-ingest export -o words.tsv         # export all words");
    println!("  word-ingest export -o nouns.tsv -c NN   # export nouns only");
}
