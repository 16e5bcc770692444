//! Graph topology statistics and score-vector helpers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::Node;

/// Read-only summary of a built citation graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,

    pub total_edges: usize,

    pub avg_in_degree: f64,

    pub avg_out_degree: f64,

    pub max_in_degree: usize,

    pub max_out_degree: usize,

    /// First paper (in insertion order) reaching `max_in_degree`; absent when it is 0
    pub most_cited_paper: Option<String>,

    /// First paper (in insertion order) reaching `max_out_degree`; absent when it is 0
    pub most_citing_paper: Option<String>,

    /// Papers with no incoming and no outgoing edges
    pub isolated_nodes: usize,

    /// Citations dropped because a paper cited itself
    pub self_citations: usize,

    /// Citations dropped because an endpoint is not in the paper set
    pub dangling_references: usize,

    /// Paper records that overwrote an earlier record with the same id
    pub duplicate_papers: usize,

    /// edges / (nodes * (nodes - 1)), or 0 with fewer than two nodes
    pub graph_density: f64,
}

/// Counters collected while filtering raw citations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BuildCounters {
    pub self_citations: usize,
    pub dangling_references: usize,
    pub duplicate_papers: usize,
}

impl GraphStats {
    /// Single pass over the degree maps in node order
    pub(crate) fn compute(
        nodes: &[Node],
        total_edges: usize,
        in_degree: &BTreeMap<String, usize>,
        out_degree: &BTreeMap<String, usize>,
        counters: BuildCounters,
    ) -> Self {
        let mut stats = GraphStats {
            total_nodes: nodes.len(),
            total_edges,
            self_citations: counters.self_citations,
            dangling_references: counters.dangling_references,
            duplicate_papers: counters.duplicate_papers,
            ..Default::default()
        };

        if stats.total_nodes == 0 {
            return stats;
        }

        let mut total_in = 0usize;
        let mut total_out = 0usize;

        for node in nodes {
            let in_deg = in_degree.get(&node.id).copied().unwrap_or(0);
            let out_deg = out_degree.get(&node.id).copied().unwrap_or(0);

            total_in += in_deg;
            total_out += out_deg;

            // Strict comparison keeps the first node reaching the maximum
            if in_deg > stats.max_in_degree {
                stats.max_in_degree = in_deg;
                stats.most_cited_paper = Some(node.id.clone());
            }
            if out_deg > stats.max_out_degree {
                stats.max_out_degree = out_deg;
                stats.most_citing_paper = Some(node.id.clone());
            }

            if in_deg == 0 && out_deg == 0 {
                stats.isolated_nodes += 1;
            }
        }

        let n = stats.total_nodes as f64;
        stats.avg_in_degree = total_in as f64 / n;
        stats.avg_out_degree = total_out as f64 / n;

        if stats.total_nodes > 1 {
            let possible = stats.total_nodes as f64 * (stats.total_nodes - 1) as f64;
            stats.graph_density = stats.total_edges as f64 / possible;
        }

        stats
    }

    /// Share of isolated nodes in percent
    pub fn isolated_ratio(&self) -> f64 {
        if self.total_nodes == 0 {
            return 0.0;
        }
        self.isolated_nodes as f64 / self.total_nodes as f64 * 100.0
    }
}

/// Sum of a score vector (Neumaier compensated)
pub fn total_mass(scores: &[f64]) -> f64 {
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;

    for &value in scores {
        let t = sum + value;
        if sum.abs() >= value.abs() {
            compensation += (sum - t) + value;
        } else {
            compensation += (value - t) + sum;
        }
        sum = t;
    }

    sum + compensation
}

/// Max absolute element-wise difference (L-infinity distance)
pub fn max_abs_delta(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            title: String::new(),
            year: 2020,
            authors: Vec::new(),
        }
    }

    fn degrees(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|(id, d)| (id.to_string(), *d)).collect()
    }

    #[test]
    fn test_empty_graph_stats() {
        let stats = GraphStats::compute(
            &[],
            0,
            &BTreeMap::new(),
            &BTreeMap::new(),
            BuildCounters::default(),
        );
        assert_eq!(stats, GraphStats::default());
    }

    #[test]
    fn test_degree_summary() {
        // A -> B, C -> B, D isolated
        let nodes = [node("A"), node("B"), node("C"), node("D")];
        let in_degree = degrees(&[("A", 0), ("B", 2), ("C", 0), ("D", 0)]);
        let out_degree = degrees(&[("A", 1), ("B", 0), ("C", 1), ("D", 0)]);

        let stats =
            GraphStats::compute(&nodes, 2, &in_degree, &out_degree, BuildCounters::default());

        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.avg_in_degree, 0.5);
        assert_eq!(stats.avg_out_degree, 0.5);
        assert_eq!(stats.max_in_degree, 2);
        assert_eq!(stats.most_cited_paper.as_deref(), Some("B"));
        // A and C tie on out-degree; A comes first
        assert_eq!(stats.most_citing_paper.as_deref(), Some("A"));
        assert_eq!(stats.isolated_nodes, 1);
        assert_eq!(stats.isolated_ratio(), 25.0);
        assert!((stats.graph_density - 2.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_edges_has_no_most_cited() {
        let nodes = [node("A")];
        let zero = degrees(&[("A", 0)]);
        let stats = GraphStats::compute(&nodes, 0, &zero, &zero, BuildCounters::default());
        assert_eq!(stats.most_cited_paper, None);
        assert_eq!(stats.graph_density, 0.0);
        assert_eq!(stats.isolated_nodes, 1);
    }

    #[test]
    fn test_total_mass_compensated() {
        let scores = vec![0.1; 10];
        assert!((total_mass(&scores) - 1.0).abs() < 1e-15);
        assert_eq!(total_mass(&[]), 0.0);
    }

    #[test]
    fn test_max_abs_delta() {
        assert_eq!(max_abs_delta(&[0.5, 0.25, 0.25], &[0.25, 0.5, 0.25]), 0.25);
        assert_eq!(max_abs_delta(&[], &[]), 0.0);
    }
}
