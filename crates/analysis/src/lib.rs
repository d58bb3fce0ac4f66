//! Citeorder Analysis
//!
//! Citation co-occurrence and ordering statistics over a corpus of
//! documents:
//!
//! ```text
//! raw texts ──► CitationExtractor ──► Sequence per document
//!           ──► PairStatisticsAggregator ──► PairStatistics
//!           ──► ResultRanker (threshold + probability rows + sort) ──► ResultTable
//! ```
//!
//! Everything here is a pure, in-memory computation. Loading corpora and
//! writing tables belongs to the caller.

pub mod aggregator;
pub mod extractor;
pub mod probability;
pub mod ranker;

pub use aggregator::{AggregationMode, Orientation, PairCounters, PairKey, PairStatistics, PairStatisticsAggregator};
pub use extractor::{CitationExtractor, Sequence, DEFAULT_CITATION_PATTERN};
pub use probability::{ResultRow, PROBABILITY_DECIMALS};
pub use ranker::{ResultRanker, ResultTable, Threshold};

use citeorder_common::config::{AnalysisConfig, ExtractionConfig};
use citeorder_common::errors::Result;
use citeorder_common::metrics::{self, AnalysisMetrics};
use serde::Serialize;
use tracing::info;

/// Outcome of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Documents in the corpus
    pub documents: usize,

    /// Citation tokens across all documents
    pub citations: usize,

    /// Distinct pair keys before threshold filtering
    pub pair_keys: usize,

    /// Qualifying position pairs before threshold filtering
    pub position_pairs: u64,

    /// Threshold applied to the table
    pub threshold: Threshold,

    /// Ranked rows
    pub table: ResultTable,
}

/// End-to-end pipeline: extraction, aggregation, ranking
#[derive(Debug, Clone, Default)]
pub struct CitationOrderAnalyzer {
    extractor: CitationExtractor,
    aggregator: PairStatisticsAggregator,
    ranker: ResultRanker,
}

impl CitationOrderAnalyzer {
    /// Analyzer with the built-in pattern, sequential aggregation, and the given threshold
    pub fn new(threshold: i64) -> Result<Self> {
        Ok(Self {
            ranker: ResultRanker::new(Threshold::new(threshold)?),
            ..Self::default()
        })
    }

    /// Build from the `analysis` and `extraction` config sections
    pub fn from_config(analysis: &AnalysisConfig, extraction: &ExtractionConfig) -> Result<Self> {
        let extractor = CitationExtractor::from_pattern(extraction.pattern.as_deref())?
            .keep_delimiters(extraction.keep_delimiters);

        let mode = if analysis.parallel {
            AggregationMode::Parallel { batch_size: analysis.batch_size }
        } else {
            AggregationMode::Sequential
        };

        Ok(Self {
            extractor,
            aggregator: PairStatisticsAggregator::new(mode)?,
            ranker: ResultRanker::new(Threshold::new(analysis.threshold)?),
        })
    }

    pub fn threshold(&self) -> Threshold {
        self.ranker.threshold()
    }

    /// Analyze raw document texts; `None` stands for a missing cell
    pub fn analyze_texts<'a, I>(&self, texts: I) -> AnalysisReport
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let sequences = self.extractor.extract_all(texts);
        self.analyze_sequences(&sequences)
    }

    /// Analyze already-extracted sequences
    pub fn analyze_sequences(&self, sequences: &[Sequence]) -> AnalysisReport {
        let timer = AnalysisMetrics::start();

        let citations: usize = sequences.iter().map(Sequence::len).sum();
        metrics::record_extraction(sequences.len(), citations);

        let stats = self.aggregator.aggregate(sequences);
        let table = self.ranker.rank(&stats);

        let elapsed = timer.finish(table.len());

        info!(
            documents = sequences.len(),
            citations,
            pair_keys = stats.len(),
            rows = table.len(),
            threshold = self.threshold().get(),
            elapsed_ms = (elapsed * 1000.0) as u64,
            "Citation pair analysis complete"
        );

        AnalysisReport {
            documents: sequences.len(),
            citations,
            pair_keys: stats.len(),
            position_pairs: stats.position_pairs(),
            threshold: self.threshold(),
            table,
        }
    }
}

/// Rank the citation pairs of pre-extracted sequences.
///
/// Fails only on a negative threshold.
pub fn analyze_pair_correlations(sequences: &[Sequence], threshold: i64) -> Result<ResultTable> {
    let analyzer = CitationOrderAnalyzer::new(threshold)?;
    Ok(analyzer.analyze_sequences(sequences).table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeorder_common::errors::AppError;

    fn corpus(docs: &[&[&str]]) -> Vec<Sequence> {
        docs.iter().map(|d| d.iter().copied().collect()).collect()
    }

    #[test]
    fn test_three_document_corpus() {
        let sequences = corpus(&[&["A", "B"], &["B", "A"], &["A", "B"]]);
        let table = analyze_pair_correlations(&sequences, 1).unwrap();

        let rows: Vec<(&str, &str, f64, u64)> = table
            .iter()
            .map(|r| (r.item_first.as_str(), r.item_second.as_str(), r.probability, r.quantity))
            .collect();
        assert_eq!(rows, vec![("A", "B", 0.6667, 3), ("B", "A", 0.3333, 3)]);
    }

    #[test]
    fn test_threshold_five_empties_small_corpus() {
        let sequences = corpus(&[&["A", "B"], &["B", "A"], &["A", "B"]]);
        let table = analyze_pair_correlations(&sequences, 5).unwrap();

        assert!(table.is_empty());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = analyze_pair_correlations(&[], -3).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn test_analyze_texts_end_to_end() {
        let analyzer = CitationOrderAnalyzer::new(2).unwrap();
        let texts = [
            Some("〚孔子〛 cites 《論語》"),
            Some("《論語》 then 〚孔子〛 then 《論語》"),
            None,
            Some("〚孔子〛《論語》"),
            Some(""),
        ];
        let report = analyzer.analyze_texts(texts);

        assert_eq!(report.documents, 5);
        assert_eq!(report.citations, 7);
        assert_eq!(report.pair_keys, 1);
        // doc0: 1, doc1: (論語,孔子) + (孔子,論語) = 2, doc3: 1
        assert_eq!(report.position_pairs, 4);
        assert_eq!(report.table.len(), 2);
        assert!(report.table.iter().all(|r| r.quantity == 4));

        let kong_first = report.table.iter().find(|r| r.item_first == "孔子").unwrap();
        assert_eq!(kong_first.probability, 0.75);
    }

    #[test]
    fn test_from_config() {
        let analysis = AnalysisConfig {
            threshold: 0,
            parallel: true,
            batch_size: 2,
        };
        let extraction = ExtractionConfig {
            pattern: Some(r"\[([^\]]+)\]".to_string()),
            keep_delimiters: false,
        };
        let analyzer = CitationOrderAnalyzer::from_config(&analysis, &extraction).unwrap();
        let report = analyzer.analyze_texts([Some("[x] [y]"), Some("[y] [x]"), Some("[x] [z]")]);

        assert_eq!(report.pair_keys, 2);
        assert_eq!(report.table.len(), 4);
        assert_eq!(report.table.rows()[0].quantity, 2);
    }

    #[test]
    fn test_from_config_rejects_bad_input() {
        let extraction = ExtractionConfig::default();

        let negative = AnalysisConfig { threshold: -1, ..AnalysisConfig::default() };
        assert!(CitationOrderAnalyzer::from_config(&negative, &extraction).is_err());

        let zero_batch = AnalysisConfig { parallel: true, batch_size: 0, ..AnalysisConfig::default() };
        assert!(CitationOrderAnalyzer::from_config(&zero_batch, &extraction).is_err());

        let bad_pattern = ExtractionConfig { pattern: Some("(".into()), keep_delimiters: false };
        assert!(CitationOrderAnalyzer::from_config(&AnalysisConfig::default(), &bad_pattern).is_err());
    }
}
