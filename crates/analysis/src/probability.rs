//! Directional ordering probabilities
//!
//! Each pair key becomes two rows, A→B and B→A, whose probabilities are
//! the share of occurrences in which that token came first. Both rows are
//! emitted even when one direction never occurred.

use serde::{Deserialize, Serialize};

use crate::aggregator::{PairCounters, PairKey};

/// Decimal places kept in reported probabilities
pub const PROBABILITY_DECIMALS: usize = 4;

/// One directional interpretation of a pair key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Token that comes first in this direction
    #[serde(rename = "cit1")]
    pub item_first: String,

    /// Token that comes second in this direction
    #[serde(rename = "cit2")]
    pub item_second: String,

    /// Share of co-occurrences in which `item_first` preceded `item_second` (0.0 - 1.0)
    pub probability: f64,

    /// Total co-occurrences of the pair, shared by both directions
    pub quantity: u64,
}

/// Round to [`PROBABILITY_DECIMALS`] places, ties to even.
///
/// Formatting rounds from the exact binary value, so `1/32` gives `0.0312`
/// and the two directions of a pair still sum to one.
pub fn round_probability(value: f64) -> f64 {
    format!("{:.*}", PROBABILITY_DECIMALS, value).parse().unwrap_or(value)
}

/// Derive the A→B and B→A rows for one key.
///
/// `None` when `total` is zero, which the aggregator never produces.
pub fn directional_rows(key: &PairKey, counters: &PairCounters) -> Option<[ResultRow; 2]> {
    let total = counters.total();
    if total == 0 {
        return None;
    }

    let forward = ResultRow {
        item_first: key.first().to_string(),
        item_second: key.second().to_string(),
        probability: round_probability(counters.canonical_first() as f64 / total as f64),
        quantity: total,
    };

    let backward = ResultRow {
        item_first: key.second().to_string(),
        item_second: key.first().to_string(),
        probability: round_probability(counters.canonical_second() as f64 / total as f64),
        quantity: total,
    };

    Some([forward, backward])
}

/// Flatten keys into directional rows, keeping key order
pub fn compute_rows<'a, I>(pairs: I) -> Vec<ResultRow>
where
    I: IntoIterator<Item = (&'a PairKey, &'a PairCounters)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, counters)| directional_rows(key, counters))
        .flatten()
        .collect()
}
