//! Ranked, tab-delimited export of the frequency table

use crate::errors::Result;
use crate::repository::WordFrequencyRepository;
use crate::types::WordRecord;
use std::io::Write;
use std::path::Path;

const HEADER: &str = "word\tcount\tcategory\tcategory_pct\toverall_pct";

/// Totals reported after rendering an export
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportReport {
    /// Data rows written (header excluded)
    pub rows: usize,
    /// Sum of the category-percentage column
    pub category_pct_sum: f64,
    /// Sum of the overall-percentage column
    pub overall_pct_sum: f64,
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Render ranked records into `sink` as tab-delimited text.
///
/// `filtered_total` is the sum of counts among all records matching the
/// active category filter; `grand_total` is the sum over the whole store.
/// A zero denominator yields a 0.00 percentage rather than an error.
pub fn render_export<W: Write>(
    sink: &mut W,
    records: &[WordRecord],
    filtered_total: u64,
    grand_total: u64,
) -> Result<ExportReport> {
    writeln!(sink, "{}", HEADER)?;

    let mut report = ExportReport::default();
    for record in records {
        let category_pct = percentage(record.count, filtered_total);
        let overall_pct = percentage(record.count, grand_total);
        writeln!(
            sink,
            "{}\t{}\t{}\t{:.2}\t{:.2}",
            record.word, record.count, record.category, category_pct, overall_pct
        )?;
        report.rows += 1;
        report.category_pct_sum += category_pct;
        report.overall_pct_sum += overall_pct;
    }

    Ok(report)
}

/// Export ranked words to a file, with an optional row limit and category
/// substring filter
pub async fn export_to_path(
    words: &dyn WordFrequencyRepository,
    output: &Path,
    limit: Option<u32>,
    category_pattern: Option<&str>,
) -> Result<ExportReport> {
    let records = words.ranked_records(limit, category_pattern).await?;
    let filtered_total = words.category_total(category_pattern).await?;
    let grand_total = words.total_occurrences().await?;

    let mut sink = std::fs::File::create(output)?;
    let report = render_export(&mut sink, &records, filtered_total, grand_total)?;
    sink.flush()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryWordStore, WordFrequencyRepository};
    use crate::tagger::HeuristicTagger;
    use crate::tokenizer::tokenize;
    use crate::types::TokenBatch;

    async fn seeded_store() -> MemoryWordStore {
        let store = MemoryWordStore::new();
        let tagger = HeuristicTagger::new();
        // the -> DT (4), cat -> NN (3), dog -> NN (2), running -> VBG (1)
        let text = "the the the the cat cat cat dog dog running";
        store
            .merge(&TokenBatch::from_tokens(tokenize(text)), &tagger)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_unfiltered_export_percentages_sum_to_100() {
        let store = seeded_store().await;
        let records = store.ranked_records(None, None).await.unwrap();
        let total = store.total_occurrences().await.unwrap();

        let mut sink = Vec::new();
        let report = render_export(&mut sink, &records, total, total).unwrap();

        assert_eq!(report.rows, 4);
        assert!((report.category_pct_sum - 100.0).abs() < 0.01);
        assert!((report.overall_pct_sum - 100.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_filtered_export_overall_percentages_sum_below_100() {
        let store = seeded_store().await;
        let records = store.ranked_records(None, Some("NN")).await.unwrap();
        let filtered_total = store.category_total(Some("NN")).await.unwrap();
        let grand_total = store.total_occurrences().await.unwrap();

        let mut sink = Vec::new();
        let report = render_export(&mut sink, &records, filtered_total, grand_total).unwrap();

        // cat + dog only
        assert_eq!(report.rows, 2);
        assert!((report.category_pct_sum - 100.0).abs() < 0.01);
        assert!(report.overall_pct_sum < 100.0);
        assert!((report.overall_pct_sum - 50.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_export_format_and_ordering() {
        let store = seeded_store().await;
        let records = store.ranked_records(None, None).await.unwrap();
        let total = store.total_occurrences().await.unwrap();

        let mut sink = Vec::new();
        render_export(&mut sink, &records, total, total).unwrap();
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "word\tcount\tcategory\tcategory_pct\toverall_pct");
        assert_eq!(lines[1], "the\t4\tDT\t40.00\t40.00");
        assert_eq!(lines[2], "cat\t3\tNN\t30.00\t30.00");
        assert_eq!(lines[3], "dog\t2\tNN\t20.00\t20.00");
        assert_eq!(lines[4], "running\t1\tVBG\t10.00\t10.00");
    }

    #[test]
    fn test_empty_export_is_header_only_with_zero_sums() {
        let mut sink = Vec::new();
        let report = render_export(&mut sink, &[], 0, 0).unwrap();

        assert_eq!(report.rows, 0);
        assert_eq!(report.category_pct_sum, 0.0);
        assert_eq!(report.overall_pct_sum, 0.0);
        assert_eq!(String::from_utf8(sink).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_export_to_path_writes_file() {
        let store = seeded_store().await;
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("words_export.txt");

        let report = export_to_path(&store, &output, Some(2), None).await.unwrap();

        assert_eq!(report.rows, 2);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("word\t"));
        assert_eq!(text.lines().count(), 3);
    }
}
