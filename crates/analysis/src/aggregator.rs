//! Pairwise co-occurrence aggregation
//!
//! Scans every sequence for all position pairs `(i, j)` with `i < j` and
//! tallies them under an unordered, lexicographically canonical pair key,
//! remembering which of the two tokens came first.
//!
//! Counting is per sequence: tokens from different documents never
//! interact. Merging partial statistics is plain integer addition, so the
//! corpus may be split into batches and aggregated in any order.

use citeorder_common::errors::{AppError, Result};
use citeorder_common::metrics;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::extractor::Sequence;

/// Unordered pair of two distinct citation tokens, stored smaller-first
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairKey {
    first: String,
    second: String,
}

/// Which token of a [`PairKey`] appeared earlier in the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The lexicographically smaller token came first
    CanonicalFirst,
    /// The lexicographically larger token came first
    CanonicalSecond,
}

impl PairKey {
    /// Canonicalize an ordered occurrence.
    ///
    /// Returns `None` for a self-pair.
    pub fn canonical(earlier: &str, later: &str) -> Option<(Self, Orientation)> {
        if earlier == later {
            return None;
        }

        let (first, second, orientation) = if earlier < later {
            (earlier, later, Orientation::CanonicalFirst)
        } else {
            (later, earlier, Orientation::CanonicalSecond)
        };

        Some((
            Self {
                first: first.to_string(),
                second: second.to_string(),
            },
            orientation,
        ))
    }

    /// The lexicographically smaller token
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger token
    pub fn second(&self) -> &str {
        &self.second
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Directional tallies for one pair key.
///
/// `total == canonical_first + canonical_second` always holds; counters
/// only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PairCounters {
    total: u64,
    canonical_first: u64,
    canonical_second: u64,
}

impl PairCounters {
    fn record(&mut self, orientation: Orientation) {
        self.total += 1;
        match orientation {
            Orientation::CanonicalFirst => self.canonical_first += 1,
            Orientation::CanonicalSecond => self.canonical_second += 1,
        }
    }

    fn absorb(&mut self, other: &PairCounters) {
        self.total += other.total;
        self.canonical_first += other.canonical_first;
        self.canonical_second += other.canonical_second;
    }

    /// Number of qualifying position pairs across the corpus
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Occurrences with the smaller token first
    pub fn canonical_first(&self) -> u64 {
        self.canonical_first
    }

    /// Occurrences with the larger token first
    pub fn canonical_second(&self) -> u64 {
        self.canonical_second
    }
}

/// Per-pair counters for a whole corpus (or a batch of it).
///
/// Keys iterate in canonical order, which keeps downstream row order
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairStatistics {
    pairs: BTreeMap<PairKey, PairCounters>,
}

impl PairStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every ordered position pair of one sequence
    pub fn observe(&mut self, sequence: &Sequence) {
        let tokens = sequence.tokens();
        if tokens.len() < 2 {
            return;
        }

        for (i, earlier) in tokens.iter().enumerate() {
            for later in &tokens[i + 1..] {
                if let Some((key, orientation)) = PairKey::canonical(earlier, later) {
                    self.pairs.entry(key).or_default().record(orientation);
                }
            }
        }
    }

    /// Combine two partial statistics
    pub fn merge(mut self, mut other: PairStatistics) -> PairStatistics {
        if self.pairs.len() < other.pairs.len() {
            std::mem::swap(&mut self, &mut other);
        }

        for (key, counters) in other.pairs {
            self.pairs.entry(key).or_default().absorb(&counters);
        }

        self
    }

    /// Counters for a pair, in either argument order
    pub fn get(&self, a: &str, b: &str) -> Option<&PairCounters> {
        let (key, _) = PairKey::canonical(a, b)?;
        self.pairs.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &PairCounters)> {
        self.pairs.iter()
    }

    /// Number of distinct pair keys
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of `total` over all keys
    pub fn position_pairs(&self) -> u64 {
        self.pairs.values().map(PairCounters::total).sum()
    }
}

/// How the aggregator walks the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// One pass on the calling thread
    Sequential,
    /// Fold `batch_size` sequences at a time on the rayon pool, then merge
    Parallel { batch_size: usize },
}

impl AggregationMode {
    fn label(&self) -> &'static str {
        match self {
            AggregationMode::Sequential => "sequential",
            AggregationMode::Parallel { .. } => "parallel",
        }
    }
}

/// Builds [`PairStatistics`] from a corpus of sequences
#[derive(Debug, Clone)]
pub struct PairStatisticsAggregator {
    mode: AggregationMode,
}

impl PairStatisticsAggregator {
    /// Create an aggregator; a parallel batch size of zero is rejected
    pub fn new(mode: AggregationMode) -> Result<Self> {
        if let AggregationMode::Parallel { batch_size: 0 } = mode {
            return Err(AppError::invalid_argument("batch_size", "must be at least 1"));
        }
        Ok(Self { mode })
    }

    pub fn sequential() -> Self {
        Self {
            mode: AggregationMode::Sequential,
        }
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// Aggregate all sequences into per-pair counters
    pub fn aggregate(&self, sequences: &[Sequence]) -> PairStatistics {
        let stats = match self.mode {
            AggregationMode::Sequential => {
                let mut stats = PairStatistics::new();
                for sequence in sequences {
                    stats.observe(sequence);
                }
                stats
            }
            AggregationMode::Parallel { batch_size } => sequences
                .par_chunks(batch_size)
                .map(|batch| {
                    let mut partial = PairStatistics::new();
                    for sequence in batch {
                        partial.observe(sequence);
                    }
                    partial
                })
                .reduce(PairStatistics::new, PairStatistics::merge),
        };

        let position_pairs = stats.position_pairs();
        metrics::record_aggregation(position_pairs, stats.len(), self.mode.label());

        debug!(
            sequences = sequences.len(),
            pair_keys = stats.len(),
            position_pairs,
            mode = self.mode.label(),
            "Pair statistics aggregated"
        );

        stats
    }
}

impl Default for PairStatisticsAggregator {
    fn default() -> Self {
        Self::sequential()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tokens: &[&str]) -> Sequence {
        tokens.iter().copied().collect()
    }

    #[test]
    fn test_canonical_key_is_order_independent() {
        let (ab, o1) = PairKey::canonical("A", "B").unwrap();
        let (ba, o2) = PairKey::canonical("B", "A").unwrap();

        assert_eq!(ab, ba);
        assert_eq!(ab.first(), "A");
        assert_eq!(ab.second(), "B");
        assert_eq!(o1, Orientation::CanonicalFirst);
        assert_eq!(o2, Orientation::CanonicalSecond);
        assert!(PairKey::canonical("A", "A").is_none());
    }

    #[test]
    fn test_directional_tallies() {
        let corpus = vec![seq(&["A", "B"]), seq(&["B", "A"]), seq(&["A", "B"])];
        let stats = PairStatisticsAggregator::sequential().aggregate(&corpus);

        let counters = stats.get("A", "B").unwrap();
        assert_eq!(counters.total(), 3);
        assert_eq!(counters.canonical_first(), 2);
        assert_eq!(counters.canonical_second(), 1);
        assert_eq!(stats.get("B", "A"), Some(counters));
    }

    #[test]
    fn test_single_token_contributes_nothing() {
        let stats = PairStatisticsAggregator::sequential().aggregate(&[seq(&["X"]), seq(&[])]);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_repeated_token_skips_self_pair() {
        let stats = PairStatisticsAggregator::sequential().aggregate(&[seq(&["X", "X", "Y"])]);

        assert_eq!(stats.len(), 1);
        let counters = stats.get("X", "Y").unwrap();
        assert_eq!(counters.total(), 2);
        assert_eq!(counters.canonical_first(), 2);
        assert!(stats.get("X", "X").is_none());
    }

    #[test]
    fn test_all_position_pairs_not_just_adjacent() {
        let stats = PairStatisticsAggregator::sequential().aggregate(&[seq(&["C", "B", "A"])]);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats.position_pairs(), 3);
        // A is never first
        assert_eq!(stats.get("A", "C").unwrap().canonical_second(), 1);
        assert_eq!(stats.get("A", "B").unwrap().canonical_second(), 1);
        assert_eq!(stats.get("B", "C").unwrap().canonical_second(), 1);
    }

    #[test]
    fn test_documents_do_not_interact() {
        let stats = PairStatisticsAggregator::sequential().aggregate(&[seq(&["A"]), seq(&["B"])]);
        assert!(stats.get("A", "B").is_none());
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let left = vec![seq(&["A", "B", "C"]), seq(&["C", "A"])];
        let right = vec![seq(&["B", "A"]), seq(&["D", "C", "B"])];
        let all: Vec<Sequence> = left.iter().chain(right.iter()).cloned().collect();

        let aggregator = PairStatisticsAggregator::sequential();
        let merged = aggregator.aggregate(&left).merge(aggregator.aggregate(&right));

        assert_eq!(merged, aggregator.aggregate(&all));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let corpus: Vec<Sequence> = (0..50)
            .map(|i| seq(&[["A", "B", "C", "D"][i % 4], "E", ["D", "C", "B", "A"][i % 3]]))
            .collect();

        let sequential = PairStatisticsAggregator::sequential().aggregate(&corpus);
        let parallel = PairStatisticsAggregator::new(AggregationMode::Parallel { batch_size: 7 })
            .unwrap()
            .aggregate(&corpus);

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = PairStatisticsAggregator::new(AggregationMode::Parallel { batch_size: 0 }).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }
}
