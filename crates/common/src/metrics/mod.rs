//! Metrics and observability utilities
//!
//! Describes the analysis metrics through the `metrics` facade.
//! Nothing is exported unless the embedding application installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all citeorder metrics
pub const METRICS_PREFIX: &str = "citeorder";

/// Register all metric descriptions
pub fn register_metrics() {
    // Extraction metrics
    describe_counter!(
        format!("{}_documents_scanned_total", METRICS_PREFIX),
        Unit::Count,
        "Total documents passed through citation extraction"
    );

    describe_counter!(
        format!("{}_citations_extracted_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation tokens extracted"
    );

    // Aggregation metrics
    describe_counter!(
        format!("{}_position_pairs_total", METRICS_PREFIX),
        Unit::Count,
        "Total ordered position pairs counted towards a pair key"
    );

    describe_gauge!(
        format!("{}_pair_keys", METRICS_PREFIX),
        Unit::Count,
        "Distinct pair keys in the last aggregation"
    );

    // Ranking metrics
    describe_gauge!(
        format!("{}_result_rows", METRICS_PREFIX),
        Unit::Count,
        "Rows in the last ranked result table"
    );

    describe_histogram!(
        format!("{}_analysis_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end analysis latency in seconds"
    );

    tracing::debug!("Metrics registered");
}

/// Helper to record extraction metrics
pub fn record_extraction(documents: usize, citations: usize) {
    counter!(format!("{}_documents_scanned_total", METRICS_PREFIX)).increment(documents as u64);
    counter!(format!("{}_citations_extracted_total", METRICS_PREFIX)).increment(citations as u64);
}

/// Helper to record aggregation metrics
pub fn record_aggregation(position_pairs: u64, pair_keys: usize, mode: &str) {
    counter!(
        format!("{}_position_pairs_total", METRICS_PREFIX),
        "mode" => mode.to_string()
    )
    .increment(position_pairs);

    gauge!(format!("{}_pair_keys", METRICS_PREFIX)).set(pair_keys as f64);
}

/// Helper to record a full analysis run
pub struct AnalysisMetrics {
    start: Instant,
}

impl AnalysisMetrics {
    /// Start tracking an analysis
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record analysis completion, returning the elapsed seconds
    pub fn finish(self, result_rows: usize) -> f64 {
        let duration = self.start.elapsed().as_secs_f64();

        histogram!(format!("{}_analysis_duration_seconds", METRICS_PREFIX)).record(duration);
        gauge!(format!("{}_result_rows", METRICS_PREFIX)).set(result_rows as f64);

        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_metrics() {
        register_metrics();
        let metrics = AnalysisMetrics::start();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let elapsed = metrics.finish(4);
        assert!(elapsed > 0.0);
    }

    #[test]
    fn test_record_helpers_without_recorder() {
        // No recorder installed: recording must be a silent no-op
        record_extraction(3, 7);
        record_aggregation(12, 4, "sequential");
    }
}
