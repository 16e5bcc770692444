//! PageRank-based citation scoring
//!
//! Damped power iteration over the citation graph. Each sweep computes a
//! complete new score vector from the previous one (two buffers swapped
//! between sweeps, no in-place updates), so the dangling share and every
//! node's contribution are taken from the same frozen vector.
//!
//! For node `i` in one sweep:
//!
//! ```text
//! next[i] = (1 - d) / N
//!         + d * (sum of dangling scores) / N          (when handle_dangling)
//!         + sum over edges j -> i of d * cur[j] / out_degree(j)
//! ```
//!
//! With dangling handling on, the total mass stays 1 after every sweep.

use chrono::{DateTime, Utc};
use citerank_common::errors::{AppError, Result};
use citerank_common::{metrics, PageRankConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::graph::CitationGraph;
use crate::stats::{max_abs_delta, total_mass};
use crate::{PaperScore, RankComparison};

/// Convergence diagnostics of one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankStats {
    /// Sweeps actually performed (never above `max_iterations`)
    pub iterations: usize,

    /// Whether the last delta fell below the tolerance
    pub converged: bool,

    /// Wall-clock time of the computation in milliseconds
    pub duration_ms: f64,

    /// When the computation started
    pub computed_at: DateTime<Utc>,

    /// Papers without outgoing citations
    pub dangling_nodes: usize,

    /// Max per-node score change in the last sweep
    pub max_score_change: f64,

    pub top_paper: String,

    pub top_score: f64,
}

/// Scores, configuration, diagnostics and full ranking of one computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankResult {
    /// paper_id -> PageRank score
    pub scores: BTreeMap<String, f64>,

    pub config: PageRankConfig,

    pub stats: PageRankStats,

    /// All papers by descending score; ties keep graph insertion order
    pub rankings: Vec<PaperScore>,
}

/// State handed to an observer after each sweep
#[derive(Debug, Clone, Copy)]
pub struct IterationSnapshot<'a> {
    /// 1-based sweep number
    pub iteration: usize,

    /// Freshly computed scores, indexed by graph insertion order
    pub scores: &'a [f64],

    /// Max per-node change against the previous sweep
    pub delta: f64,
}

impl IterationSnapshot<'_> {
    /// Total probability mass of this sweep
    pub fn mass(&self) -> f64 {
        total_mass(self.scores)
    }
}

/// PageRank solver for citation graphs
#[derive(Debug, Clone)]
pub struct PageRankSolver {
    config: PageRankConfig,
}

impl PageRankSolver {
    /// Create a solver, rejecting an invalid configuration
    pub fn new(config: PageRankConfig) -> Result<Self> {
        config.check()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PageRankConfig {
        &self.config
    }

    /// Compute PageRank scores for all papers
    pub fn solve(&self, graph: &CitationGraph) -> Result<PageRankResult> {
        self.solve_with_observer(graph, |_| {})
    }

    /// Compute PageRank scores, calling `observer` after every sweep
    pub fn solve_with_observer<F>(
        &self,
        graph: &CitationGraph,
        mut observer: F,
    ) -> Result<PageRankResult>
    where
        F: FnMut(&IterationSnapshot<'_>),
    {
        let start = Instant::now();
        let computed_at = Utc::now();

        let n = graph.node_count();
        if n == 0 {
            return Err(AppError::EmptyGraph);
        }

        let PageRankConfig {
            damping_factor: damping,
            max_iterations,
            tolerance,
            handle_dangling,
        } = self.config;

        info!(
            nodes = n,
            edges = graph.edge_count(),
            damping_factor = damping,
            max_iterations,
            tolerance,
            handle_dangling,
            "Starting PageRank calculation"
        );

        let n_f64 = n as f64;
        let teleport = (1.0 - damping) / n_f64;

        // Resolve edges to positions once
        let links: Vec<(usize, usize)> = graph
            .edges()
            .iter()
            .filter_map(|edge| Some((graph.position(&edge.from)?, graph.position(&edge.to)?)))
            .collect();

        // Share of a node's score passed along each outgoing edge
        let mut edge_weight = vec![0.0f64; n];
        let mut dangling = Vec::new();
        for (i, node) in graph.nodes().iter().enumerate() {
            match graph.out_degree(&node.id) {
                0 => dangling.push(i),
                out => edge_weight[i] = damping / out as f64,
            }
        }

        info!(
            dangling_nodes = dangling.len(),
            dangling_pct = dangling.len() as f64 / n_f64 * 100.0,
            "Found dangling nodes"
        );

        let mut scores = vec![1.0 / n_f64; n];
        let mut next = vec![0.0f64; n];
        let mut iterations = 0;
        let mut converged = false;
        let mut delta = 0.0f64;

        while iterations < max_iterations {
            let dangling_share = if handle_dangling {
                dangling.iter().map(|&i| scores[i]).sum::<f64>() / n_f64
            } else {
                0.0
            };

            next.fill(teleport + damping * dangling_share);

            for &(from, to) in &links {
                next[to] += scores[from] * edge_weight[from];
            }

            delta = max_abs_delta(&next, &scores);
            iterations += 1;

            observer(&IterationSnapshot {
                iteration: iterations,
                scores: &next,
                delta,
            });

            std::mem::swap(&mut scores, &mut next);

            if iterations % 10 == 0 {
                debug!(iteration = iterations, max_score_change = delta, "PageRank progress");
            }

            if delta < tolerance {
                converged = true;
                break;
            }
        }

        let duration = start.elapsed();

        if converged {
            info!(
                iterations,
                max_score_change = delta,
                duration_ms = duration.as_secs_f64() * 1000.0,
                "PageRank converged"
            );
        } else {
            warn!(
                iterations,
                max_score_change = delta,
                tolerance,
                "PageRank did not converge"
            );
        }

        metrics::record_pagerank(duration, iterations, converged, delta);

        let mut rankings: Vec<PaperScore> = graph
            .nodes()
            .iter()
            .zip(&scores)
            .map(|(node, &score)| PaperScore {
                paper_id: node.id.clone(),
                title: node.title.clone(),
                year: node.year,
                score,
                citations: graph.in_degree(&node.id),
            })
            .collect();

        // Sort by score descending; sort_by is stable
        rankings.sort_by(|a, b| b.score.total_cmp(&a.score));

        let (top_paper, top_score) = rankings
            .first()
            .map(|top| (top.paper_id.clone(), top.score))
            .unwrap_or_default();

        let scores = graph
            .nodes()
            .iter()
            .zip(scores)
            .map(|(node, score)| (node.id.clone(), score))
            .collect();

        Ok(PageRankResult {
            scores,
            config: self.config,
            stats: PageRankStats {
                iterations,
                converged,
                duration_ms: duration.as_secs_f64() * 1000.0,
                computed_at,
                dangling_nodes: dangling.len(),
                max_score_change: delta,
                top_paper,
                top_score,
            },
            rankings,
        })
    }
}

impl PageRankResult {
    /// Score of one paper
    pub fn score(&self, paper_id: &str) -> Option<f64> {
        self.scores.get(paper_id).copied()
    }

    /// The `n` highest-scoring papers
    pub fn top(&self, n: usize) -> &[PaperScore] {
        &self.rankings[..n.min(self.rankings.len())]
    }

    /// Sum of all scores
    pub fn total_mass(&self) -> f64 {
        let scores: Vec<f64> = self.rankings.iter().map(|paper| paper.score).collect();
        total_mass(&scores)
    }

    /// PageRank rank against citation-count rank for the top `n` papers
    ///
    /// Citation rank orders all papers by descending citation count,
    /// keeping the PageRank order among equal counts.
    pub fn compare_with_citations(&self, n: usize) -> Vec<RankComparison> {
        let mut by_citations: Vec<&PaperScore> = self.rankings.iter().collect();
        by_citations.sort_by(|a, b| b.citations.cmp(&a.citations));

        let citation_rank: HashMap<&str, usize> = by_citations
            .iter()
            .enumerate()
            .map(|(i, paper)| (paper.paper_id.as_str(), i + 1))
            .collect();

        self.top(n)
            .iter()
            .enumerate()
            .map(|(i, paper)| RankComparison {
                pagerank_rank: i + 1,
                citation_rank: citation_rank.get(paper.paper_id.as_str()).copied().unwrap_or(0),
                paper_id: paper.paper_id.clone(),
                score: paper.score,
                citations: paper.citations,
            })
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::records::{CitationRecord, PaperRecord};
    use proptest::prelude::*;

    fn random_graph(node_count: u8, pairs: &[(u8, u8)]) -> CitationGraph {
        let papers: Vec<PaperRecord> =
            (0..node_count).map(|i| PaperRecord::new(format!("P{}", i), "", 2000)).collect();
        let citations: Vec<CitationRecord> = pairs
            .iter()
            .map(|&(a, b)| CitationRecord::new(format!("P{}", a), format!("P{}", b)))
            .collect();
        CitationGraph::build(&papers, &citations).unwrap()
    }

    proptest! {
        /// Total mass stays 1 after every sweep when dangling mass is redistributed
        #[test]
        fn prop_mass_conservation(
            node_count in 1_u8..30,
            pairs in prop::collection::vec((0_u8..30, 0_u8..30), 0..120),
            damping_factor in 0.05_f64..0.95,
        ) {
            let graph = random_graph(node_count, &pairs);
            let config = PageRankConfig {
                damping_factor,
                max_iterations: 50,
                tolerance: 1e-10,
                handle_dangling: true,
            };
            let epsilon = 1e-9 * f64::from(node_count);

            let mut worst = 0.0f64;
            let result = PageRankSolver::new(config)
                .unwrap()
                .solve_with_observer(&graph, |snapshot| {
                    worst = worst.max((snapshot.mass() - 1.0).abs());
                })
                .unwrap();

            prop_assert!(worst < epsilon, "mass drifted by {}", worst);
            prop_assert!((result.total_mass() - 1.0).abs() < epsilon);
            prop_assert!(result.scores.values().all(|&s| s >= 0.0));
        }

        /// The solver never exceeds the cap, and stopping early implies convergence
        #[test]
        fn prop_monotone_termination(
            node_count in 1_u8..20,
            pairs in prop::collection::vec((0_u8..20, 0_u8..20), 0..60),
            max_iterations in 1_usize..40,
            tolerance_exp in 2_i32..12,
        ) {
            let graph = random_graph(node_count, &pairs);
            let config = PageRankConfig {
                max_iterations,
                tolerance: 10f64.powi(-tolerance_exp),
                ..Default::default()
            };

            let mut sweeps = 0;
            let result = PageRankSolver::new(config)
                .unwrap()
                .solve_with_observer(&graph, |_| sweeps += 1)
                .unwrap();

            prop_assert!(result.stats.iterations <= max_iterations);
            prop_assert_eq!(result.stats.iterations, sweeps);
            if result.stats.iterations < max_iterations {
                prop_assert!(result.stats.converged);
            }
            if result.stats.converged {
                prop_assert!(result.stats.max_score_change < config.tolerance);
            }
            prop_assert_eq!(result.rankings.len(), graph.node_count());
        }
    }
}
