//! Metrics and observability utilities
//!
//! Provides Prometheus-style metrics for graph construction and ranking
//! with standardized naming conventions. All helpers are no-ops until a
//! recorder is installed.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram,
    gauge, histogram, Unit,
};
use std::time::{Duration, Instant};

/// Metrics prefix for all CiteRank metrics
pub const METRICS_PREFIX: &str = "citerank";

/// Buckets for stage and solver latency (in seconds)
pub const DURATION_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.500,  // 500ms
    1.000,  // 1s
    5.000,  // 5s
    30.00,  // 30s
    120.0,  // 2m
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Graph metrics
    describe_gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        Unit::Count,
        "Papers in the most recently built citation graph"
    );

    describe_gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        Unit::Count,
        "Citation edges in the most recently built citation graph"
    );

    describe_counter!(
        format!("{}_citations_dropped_total", METRICS_PREFIX),
        Unit::Count,
        "Citations excluded from the graph, by reason"
    );

    // PageRank metrics
    describe_counter!(
        format!("{}_pagerank_runs_total", METRICS_PREFIX),
        Unit::Count,
        "PageRank computations, by convergence outcome"
    );

    describe_histogram!(
        format!("{}_pagerank_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "PageRank computation latency in seconds"
    );

    describe_gauge!(
        format!("{}_pagerank_iterations", METRICS_PREFIX),
        Unit::Count,
        "Power iterations performed by the last PageRank computation"
    );

    describe_gauge!(
        format!("{}_pagerank_final_delta", METRICS_PREFIX),
        "Max per-node score change in the last iteration"
    );

    // Pipeline metrics
    describe_histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Batch pipeline stage latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time one stage of the batch pipeline
pub struct StageTimer {
    start: Instant,
    stage: String,
}

impl StageTimer {
    /// Start timing a stage
    pub fn start(stage: &str) -> Self {
        Self {
            start: Instant::now(),
            stage: stage.to_string(),
        }
    }

    /// Record stage completion and return the elapsed time
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();

        histogram!(
            format!("{}_stage_duration_seconds", METRICS_PREFIX),
            "stage" => self.stage
        )
        .record(elapsed.as_secs_f64());

        elapsed
    }
}

/// Helper to record graph construction metrics
pub fn record_graph_build(
    nodes: usize,
    edges: usize,
    self_citations: usize,
    dangling_references: usize,
) {
    gauge!(format!("{}_graph_nodes", METRICS_PREFIX)).set(nodes as f64);
    gauge!(format!("{}_graph_edges", METRICS_PREFIX)).set(edges as f64);

    counter!(
        format!("{}_citations_dropped_total", METRICS_PREFIX),
        "reason" => "self_citation"
    )
    .increment(self_citations as u64);

    counter!(
        format!("{}_citations_dropped_total", METRICS_PREFIX),
        "reason" => "unknown_endpoint"
    )
    .increment(dangling_references as u64);
}

/// Helper to record PageRank metrics
pub fn record_pagerank(duration: Duration, iterations: usize, converged: bool, final_delta: f64) {
    let outcome = if converged { "converged" } else { "exhausted" };

    counter!(
        format!("{}_pagerank_runs_total", METRICS_PREFIX),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(format!("{}_pagerank_duration_seconds", METRICS_PREFIX))
        .record(duration.as_secs_f64());

    gauge!(format!("{}_pagerank_iterations", METRICS_PREFIX)).set(iterations as f64);
    gauge!(format!("{}_pagerank_final_delta", METRICS_PREFIX)).set(final_delta);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_buckets() {
        let mut prev = 0.0;
        for &bucket in DURATION_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_stage_timer() {
        let timer = StageTimer::start("build");
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = timer.finish();
        assert!(elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: helpers must still be callable
        register_metrics();
        record_graph_build(3, 2, 1, 0);
        record_pagerank(Duration::from_millis(2), 12, true, 5e-7);
    }
}
