//! CiteRank batch job
//!
//! Runs the ranking pipeline once:
//! 1. Loads parsed papers and citations
//! 2. Builds the citation graph and saves its snapshot
//! 3. Computes PageRank and saves the result
//! 4. Reports graph statistics and rankings

mod report;

use anyhow::Context;
use citerank_citation::{CitationGraph, PageRankSolver, ParsedData};
use citerank_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics::{self, StageTimer, DURATION_BUCKETS},
    AppError, VERSION,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.observability);

    let span = tracing::info_span!("citerank", service = %config.observability.service_name);
    let _guard = span.enter();

    info!("Starting CiteRank v{}", VERSION);

    let prometheus = install_metrics(&config.observability)?;

    let outcome = run(&config);
    if let Err(e) = &outcome {
        let message = format!("{:#}", e);
        match e.downcast_ref::<AppError>() {
            Some(err) => error!(
                error = %message,
                code = err.code().as_code(),
                input_error = err.is_input_error(),
                "Ranking run failed"
            ),
            None => error!(error = %message, "Ranking run failed"),
        }
    }

    if let (Some(handle), Some(path)) = (prometheus, config.observability.metrics_path.as_deref()) {
        let written = write_metrics(&handle, Path::new(path));
        match &written {
            Ok(()) => info!(path, "Metrics written"),
            Err(e) => {
                let message = format!("{:#}", e);
                error!(error = %message, path, "Failed to write metrics");
            }
        }
        return exit_outcome(outcome, written);
    }

    outcome
}

/// A pipeline failure takes precedence over a metrics write failure
fn exit_outcome(outcome: anyhow::Result<()>, metrics: anyhow::Result<()>) -> anyhow::Result<()> {
    outcome.and(metrics)
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    let paths = &config.paths;

    let timer = StageTimer::start("load");
    let data = ParsedData::load(&paths.parsed_data)
        .with_context(|| format!("failed to load parsed data from {}", paths.parsed_data))?;
    let elapsed = timer.finish();
    info!(
        papers = data.papers.len(),
        citations = data.citations.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Parsed data loaded"
    );

    let timer = StageTimer::start("build");
    let graph = CitationGraph::build(&data.papers, &data.citations)
        .context("failed to build citation graph")?;
    timer.finish();

    graph
        .save(&paths.graph_output)
        .with_context(|| format!("failed to save graph to {}", paths.graph_output))?;
    info!(path = %paths.graph_output, "Graph saved");

    report::graph_stats(graph.stats());
    report::most_cited(&graph.top_by_citations(config.report.most_cited_n));

    let solver = PageRankSolver::new(config.pagerank)?;

    let timer = StageTimer::start("rank");
    let result = solver.solve(&graph).context("failed to calculate PageRank")?;
    timer.finish();

    result
        .save(&paths.pagerank_output)
        .with_context(|| format!("failed to save PageRank results to {}", paths.pagerank_output))?;
    info!(path = %paths.pagerank_output, "PageRank results saved");

    report::pagerank_stats(&result);
    report::top_papers(result.top(config.report.top_n));
    report::comparison(&result.compare_with_citations(config.report.compare_n));

    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Install a Prometheus recorder when a metrics file is configured
fn install_metrics(config: &ObservabilityConfig) -> anyhow::Result<Option<PrometheusHandle>> {
    if config.metrics_path.is_none() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(DURATION_BUCKETS)?
        .install_recorder()
        .context("failed to install metrics recorder")?;

    metrics::register_metrics();
    Ok(Some(handle))
}

fn write_metrics(handle: &PrometheusHandle, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, handle.render())
        .with_context(|| format!("failed to write metrics to {}", path.display()))
}
