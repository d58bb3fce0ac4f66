//! Threshold filtering and ranking
//!
//! Keys below the threshold are dropped before rows exist, so both
//! directions of a pair always survive or vanish together. Surviving rows
//! are sorted by quantity, then probability, both descending.

use citeorder_common::errors::{AppError, Result};
use citeorder_common::DEFAULT_THRESHOLD;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::aggregator::PairStatistics;
use crate::probability::{compute_rows, ResultRow};

/// Minimum `total` a pair key needs to be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Threshold(u64);

impl Threshold {
    /// Validate a caller-supplied threshold; negative values are rejected
    pub fn new(value: i64) -> Result<Self> {
        u64::try_from(value)
            .map(Threshold)
            .map_err(|_| AppError::invalid_argument("threshold", format!("must be non-negative, got {}", value)))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Whether a key with this many co-occurrences is kept
    pub fn admits(self, total: u64) -> bool {
        total >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold(DEFAULT_THRESHOLD as u64)
    }
}

impl From<u64> for Threshold {
    fn from(value: u64) -> Self {
        Threshold(value)
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ranked, threshold-filtered result rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }

    /// The first `n` rows (fewer if the table is shorter)
    pub fn head(&self, n: usize) -> &[ResultRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    /// Keep only the more likely direction of each pair.
    ///
    /// Both rows of a pair share a quantity, so the first one met in
    /// ranked order is the dominant one; an even split keeps the
    /// canonical A→B row.
    pub fn dominant(&self) -> ResultTable {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                let (a, b) = (row.item_first.as_str(), row.item_second.as_str());
                let key = if a < b { (a, b) } else { (b, a) };
                seen.insert(key)
            })
            .cloned()
            .collect();

        ResultTable { rows }
    }
}

impl IntoIterator for ResultTable {
    type Item = ResultRow;
    type IntoIter = std::vec::IntoIter<ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Quantity descending, then probability descending.
///
/// Used with a stable sort, so equal rows keep generation order.
pub fn rank_order(a: &ResultRow, b: &ResultRow) -> Ordering {
    b.quantity
        .cmp(&a.quantity)
        .then_with(|| b.probability.total_cmp(&a.probability))
}

/// Filters pair keys by threshold and ranks their directional rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRanker {
    threshold: Threshold,
}

impl ResultRanker {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Filter, derive rows, and sort
    pub fn rank(&self, stats: &PairStatistics) -> ResultTable {
        let kept = stats
            .iter()
            .filter(|(_, counters)| self.threshold.admits(counters.total()));

        let mut rows = compute_rows(kept);
        rows.sort_by(rank_order);

        debug!(
            pair_keys = stats.len(),
            rows = rows.len(),
            threshold = self.threshold.get(),
            "Result rows ranked"
        );

        if rows.is_empty() && !stats.is_empty() {
            warn!(
                pair_keys = stats.len(),
                threshold = self.threshold.get(),
                "No pair reached the co-occurrence threshold"
            );
        }

        ResultTable { rows }
    }
}
