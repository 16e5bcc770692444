//! Run report, emitted through tracing

use citerank_citation::{GraphStats, PageRankResult, PaperRanking, PaperScore, RankComparison};
use tracing::info;

const TITLE_WIDTH: usize = 40;

pub fn graph_stats(stats: &GraphStats) {
    info!(
        total_nodes = stats.total_nodes,
        total_edges = stats.total_edges,
        graph_density = stats.graph_density,
        avg_in_degree = stats.avg_in_degree,
        avg_out_degree = stats.avg_out_degree,
        "Graph statistics"
    );

    info!(
        max_in_degree = stats.max_in_degree,
        most_cited_paper = stats.most_cited_paper.as_deref().unwrap_or("-"),
        max_out_degree = stats.max_out_degree,
        most_citing_paper = stats.most_citing_paper.as_deref().unwrap_or("-"),
        "Degree extremes"
    );

    info!(
        isolated_nodes = stats.isolated_nodes,
        isolated_pct = stats.isolated_ratio(),
        self_citations = stats.self_citations,
        dangling_references = stats.dangling_references,
        duplicate_papers = stats.duplicate_papers,
        "Data quality"
    );
}

pub fn most_cited(papers: &[PaperRanking]) {
    for (i, paper) in papers.iter().enumerate() {
        info!(
            rank = i + 1,
            paper_id = %paper.paper_id,
            year = paper.year,
            citations = paper.citations,
            title = %truncate_title(&paper.title),
            "Most cited"
        );
    }
}

pub fn pagerank_stats(result: &PageRankResult) {
    let stats = &result.stats;
    let config = &result.config;

    info!(
        converged = stats.converged,
        iterations = stats.iterations,
        max_iterations = config.max_iterations,
        max_score_change = stats.max_score_change,
        tolerance = config.tolerance,
        duration_ms = stats.duration_ms,
        "PageRank results"
    );

    info!(
        dangling_nodes = stats.dangling_nodes,
        top_paper = %stats.top_paper,
        top_score = stats.top_score,
        damping_factor = config.damping_factor,
        handle_dangling = config.handle_dangling,
        "PageRank summary"
    );
}

pub fn top_papers(papers: &[PaperScore]) {
    for (i, paper) in papers.iter().enumerate() {
        info!(
            rank = i + 1,
            score = paper.score,
            citations = paper.citations,
            year = paper.year,
            title = %truncate_title(&paper.title),
            "Top by PageRank"
        );
    }
}

pub fn comparison(rows: &[RankComparison]) {
    for row in rows {
        info!(
            pagerank_rank = row.pagerank_rank,
            citation_rank = row.citation_rank,
            paper_id = %row.paper_id,
            score = row.score,
            citations = row.citations,
            "PageRank vs citation count"
        );
    }
}

/// Shorten long titles for one-line output
fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }
    let kept: String = title.chars().take(TITLE_WIDTH - 3).collect();
    format!("{}...", kept)
}
