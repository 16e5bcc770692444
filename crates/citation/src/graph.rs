//! Citation graph representation
//!
//! Provides the validated in-memory citation graph used for scoring.
//! A graph is only ever produced by [`GraphBuilder`] (or by loading a
//! snapshot that passes the same consistency checks) and is read-only
//! afterwards.

use citerank_common::errors::{AppError, Result};
use citerank_common::metrics;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::records::{CitationRecord, PaperRecord};
use crate::stats::{BuildCounters, GraphStats};
use crate::{PaperInfo, PaperRanking};

/// Paper in the citation graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    pub title: String,

    pub year: i32,

    pub authors: Vec<String>,
}

impl From<&PaperRecord> for Node {
    fn from(paper: &PaperRecord) -> Self {
        Self {
            id: paper.id.clone(),
            title: paper.title.clone(),
            year: paper.year,
            authors: paper.authors.clone(),
        }
    }
}

/// Edge in the citation graph: `from` cites `to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,

    pub to: String,
}

/// In-memory citation graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGraph")]
pub struct CitationGraph {
    /// Papers in insertion order
    nodes: Vec<Node>,

    /// Materialized citations in input order
    edges: Vec<Edge>,

    /// paper_id -> papers it cites
    adj_list: BTreeMap<String, Vec<String>>,

    /// paper_id -> number of papers citing it
    in_degree: BTreeMap<String, usize>,

    /// paper_id -> number of papers it cites
    out_degree: BTreeMap<String, usize>,

    stats: GraphStats,

    /// paper_id -> index into `nodes`
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

/// Collects papers and citations, then filters citations against the
/// complete paper set in [`GraphBuilder::build`].
///
/// A paper whose id was already added replaces the earlier record but
/// keeps the earlier position (last write wins).
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    positions: HashMap<String, usize>,
    citations: Vec<Edge>,
    duplicate_papers: usize,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder sized for the given record counts
    pub fn with_capacity(papers: usize, citations: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(papers),
            positions: HashMap::with_capacity(papers),
            citations: Vec::with_capacity(citations),
            duplicate_papers: 0,
        }
    }

    /// Add a paper; an empty id makes the record set unusable
    pub fn add_paper(&mut self, paper: &PaperRecord) -> Result<()> {
        if paper.id.trim().is_empty() {
            return Err(AppError::InvalidInput {
                message: format!("paper record #{} has an empty id", self.nodes.len()),
            });
        }

        match self.positions.get(&paper.id) {
            Some(&position) => {
                warn!(paper_id = %paper.id, "Duplicate paper id, keeping the later record");
                self.nodes[position] = Node::from(paper);
                self.duplicate_papers += 1;
            }
            None => {
                self.positions.insert(paper.id.clone(), self.nodes.len());
                self.nodes.push(Node::from(paper));
            }
        }

        Ok(())
    }

    /// Queue a citation; it is checked against the paper set at build time
    pub fn add_citation(&mut self, citation: &CitationRecord) {
        self.citations.push(Edge {
            from: citation.from.clone(),
            to: citation.to.clone(),
        });
    }

    /// Materialize the graph
    ///
    /// Citations with an unknown endpoint are dropped and counted as
    /// dangling references; self-citations are dropped and counted
    /// separately. Neither is an error.
    pub fn build(self) -> CitationGraph {
        let GraphBuilder {
            nodes,
            positions,
            citations,
            duplicate_papers,
        } = self;

        let mut adj_list: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut in_degree: BTreeMap<String, usize> = BTreeMap::new();
        let mut out_degree: BTreeMap<String, usize> = BTreeMap::new();

        for node in &nodes {
            adj_list.insert(node.id.clone(), Vec::new());
            in_degree.insert(node.id.clone(), 0);
            out_degree.insert(node.id.clone(), 0);
        }

        let raw_citations = citations.len();
        let mut edges = Vec::with_capacity(raw_citations);
        let mut counters = BuildCounters {
            duplicate_papers,
            ..Default::default()
        };

        for citation in citations {
            if !positions.contains_key(&citation.from) || !positions.contains_key(&citation.to) {
                counters.dangling_references += 1;
                continue;
            }

            if citation.from == citation.to {
                counters.self_citations += 1;
                continue;
            }

            if let Some(cited) = adj_list.get_mut(&citation.from) {
                cited.push(citation.to.clone());
            }
            if let Some(degree) = out_degree.get_mut(&citation.from) {
                *degree += 1;
            }
            if let Some(degree) = in_degree.get_mut(&citation.to) {
                *degree += 1;
            }

            edges.push(citation);
        }

        let stats = GraphStats::compute(&nodes, edges.len(), &in_degree, &out_degree, counters);

        info!(
            papers = nodes.len(),
            citations = raw_citations,
            valid_edges = edges.len(),
            self_citations = counters.self_citations,
            dangling_references = counters.dangling_references,
            duplicate_papers = counters.duplicate_papers,
            "Citation graph built"
        );

        metrics::record_graph_build(
            stats.total_nodes,
            stats.total_edges,
            stats.self_citations,
            stats.dangling_references,
        );

        CitationGraph {
            nodes,
            edges,
            adj_list,
            in_degree,
            out_degree,
            stats,
            positions,
        }
    }
}

impl CitationGraph {
    /// Build a graph from paper and citation records
    pub fn build(papers: &[PaperRecord], citations: &[CitationRecord]) -> Result<Self> {
        let mut builder = GraphBuilder::with_capacity(papers.len(), citations.len());

        for paper in papers {
            builder.add_paper(paper)?;
        }
        for citation in citations {
            builder.add_citation(citation);
        }

        Ok(builder.build())
    }

    /// All papers, in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All materialized citations, in input order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn adj_list(&self) -> &BTreeMap<String, Vec<String>> {
        &self.adj_list
    }

    pub fn in_degrees(&self) -> &BTreeMap<String, usize> {
        &self.in_degree
    }

    pub fn out_degrees(&self) -> &BTreeMap<String, usize> {
        &self.out_degree
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a paper by id
    pub fn node(&self, paper_id: &str) -> Option<&Node> {
        self.position(paper_id).map(|i| &self.nodes[i])
    }

    /// Insertion-order index of a paper
    pub fn position(&self, paper_id: &str) -> Option<usize> {
        self.positions.get(paper_id).copied()
    }

    /// Get papers cited by this paper
    pub fn references(&self, paper_id: &str) -> &[String] {
        self.adj_list.get(paper_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get citation count (incoming edges)
    pub fn in_degree(&self, paper_id: &str) -> usize {
        self.in_degree.get(paper_id).copied().unwrap_or(0)
    }

    /// Get reference count (outgoing edges)
    pub fn out_degree(&self, paper_id: &str) -> usize {
        self.out_degree.get(paper_id).copied().unwrap_or(0)
    }

    /// Neighbourhood of one paper
    pub fn paper_info(&self, paper_id: &str) -> Option<PaperInfo> {
        let node = self.node(paper_id)?;

        let citing_papers = self
            .edges
            .iter()
            .filter(|edge| edge.to == paper_id)
            .map(|edge| edge.from.clone())
            .collect();

        Some(PaperInfo {
            node: node.clone(),
            in_degree: self.in_degree(paper_id),
            out_degree: self.out_degree(paper_id),
            cited_papers: self.references(paper_id).to_vec(),
            citing_papers,
        })
    }

    /// The `n` most cited papers, by descending in-degree
    ///
    /// Ties keep insertion order. Asking for more papers than exist
    /// returns all of them.
    pub fn top_by_citations(&self, n: usize) -> Vec<PaperRanking> {
        let mut rankings: Vec<PaperRanking> = self
            .nodes
            .iter()
            .map(|node| PaperRanking {
                paper_id: node.id.clone(),
                title: node.title.clone(),
                year: node.year,
                authors: node.authors.clone(),
                citations: self.in_degree(&node.id),
                references: self.out_degree(&node.id),
            })
            .collect();

        // sort_by is stable
        rankings.sort_by(|a, b| b.citations.cmp(&a.citations));
        rankings.truncate(n);
        rankings
    }
}

/// Wire form of a graph snapshot, checked before it becomes a graph
#[derive(Deserialize)]
pub(crate) struct RawGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    adj_list: BTreeMap<String, Vec<String>>,
    in_degree: BTreeMap<String, usize>,
    out_degree: BTreeMap<String, usize>,
    stats: GraphStats,
}

fn inconsistent(message: String) -> AppError {
    AppError::InconsistentSnapshot { message }
}

impl TryFrom<RawGraph> for CitationGraph {
    type Error = AppError;

    fn try_from(raw: RawGraph) -> Result<Self> {
        let mut positions = HashMap::with_capacity(raw.nodes.len());
        for (i, node) in raw.nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(inconsistent(format!("node #{} has an empty id", i)));
            }
            if positions.insert(node.id.clone(), i).is_some() {
                return Err(inconsistent(format!("node {} appears twice", node.id)));
            }
        }

        for (name, len) in [
            ("adj_list", raw.adj_list.len()),
            ("in_degree", raw.in_degree.len()),
            ("out_degree", raw.out_degree.len()),
        ] {
            if len != positions.len() {
                return Err(inconsistent(format!(
                    "{} has {} entries for {} nodes",
                    name,
                    len,
                    positions.len()
                )));
            }
        }

        // Rebuild adjacency and in-degrees from the edge list and compare
        let mut expected_adj: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut expected_in: BTreeMap<&str, usize> = BTreeMap::new();
        for edge in &raw.edges {
            if !positions.contains_key(&edge.from) || !positions.contains_key(&edge.to) {
                return Err(inconsistent(format!(
                    "edge {} -> {} references an unknown node",
                    edge.from, edge.to
                )));
            }
            if edge.from == edge.to {
                return Err(inconsistent(format!("self-loop on {}", edge.from)));
            }
            expected_adj.entry(edge.from.as_str()).or_default().push(edge.to.clone());
            *expected_in.entry(edge.to.as_str()).or_default() += 1;
        }

        for node in &raw.nodes {
            let id = node.id.as_str();
            let cited = raw.adj_list.get(id).map(|v| v.as_slice());
            let expected = expected_adj.get(id).map(|v| v.as_slice()).unwrap_or(&[]);
            if cited != Some(expected) {
                return Err(inconsistent(format!("adjacency of {} disagrees with edges", id)));
            }
            if raw.out_degree.get(id) != Some(&expected.len()) {
                return Err(inconsistent(format!("out-degree of {} disagrees with edges", id)));
            }
            let expected_in_degree = expected_in.get(id).copied().unwrap_or(0);
            if raw.in_degree.get(id) != Some(&expected_in_degree) {
                return Err(inconsistent(format!("in-degree of {} disagrees with edges", id)));
            }
        }

        if raw.stats.total_nodes != raw.nodes.len() || raw.stats.total_edges != raw.edges.len() {
            return Err(inconsistent("stats totals disagree with nodes/edges".to_string()));
        }

        // Build counters are not derivable from the kept data, everything else is
        let counters = BuildCounters {
            self_citations: raw.stats.self_citations,
            dangling_references: raw.stats.dangling_references,
            duplicate_papers: raw.stats.duplicate_papers,
        };
        let expected_stats = GraphStats::compute(
            &raw.nodes,
            raw.edges.len(),
            &raw.in_degree,
            &raw.out_degree,
            counters,
        );
        if expected_stats != raw.stats {
            return Err(inconsistent("stats disagree with the graph topology".to_string()));
        }

        Ok(CitationGraph {
            nodes: raw.nodes,
            edges: raw.edges,
            adj_list: raw.adj_list,
            in_degree: raw.in_degree,
            out_degree: raw.out_degree,
            stats: raw.stats,
            positions,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn id(i: u8) -> String {
        format!("P{}", i)
    }

    proptest! {
        /// Degree maps always agree with adjacency and the edge list
        #[test]
        fn prop_degree_consistency(
            node_count in 0_u8..20,
            pairs in prop::collection::vec((0_u8..25, 0_u8..25), 0..80)
        ) {
            let records: Vec<PaperRecord> =
                (0..node_count).map(|i| PaperRecord::new(id(i), "", 2000)).collect();
            let citations: Vec<CitationRecord> =
                pairs.iter().map(|&(a, b)| CitationRecord::new(id(a), id(b))).collect();

            let graph = CitationGraph::build(&records, &citations).unwrap();

            for node in graph.nodes() {
                prop_assert_eq!(graph.out_degree(&node.id), graph.references(&node.id).len());
            }
            let total_in: usize = graph.in_degrees().values().sum();
            let total_out: usize = graph.out_degrees().values().sum();
            prop_assert_eq!(total_in, graph.edge_count());
            prop_assert_eq!(total_out, graph.edge_count());
            prop_assert_eq!(graph.stats().total_edges, graph.edge_count());
        }

        /// Self-citations and unknown endpoints never become edges
        #[test]
        fn prop_excluded_citations(
            node_count in 1_u8..15,
            pairs in prop::collection::vec((0_u8..20, 0_u8..20), 0..60)
        ) {
            let records: Vec<PaperRecord> =
                (0..node_count).map(|i| PaperRecord::new(id(i), "", 2000)).collect();
            let citations: Vec<CitationRecord> =
                pairs.iter().map(|&(a, b)| CitationRecord::new(id(a), id(b))).collect();

            let graph = CitationGraph::build(&records, &citations).unwrap();

            let known = |i: u8| i < node_count;
            let expected_self = pairs.iter().filter(|&&(a, b)| known(a) && a == b).count();
            let expected_dangling = pairs.iter().filter(|&&(a, b)| !known(a) || !known(b)).count();

            prop_assert_eq!(graph.stats().self_citations, expected_self);
            prop_assert_eq!(graph.stats().dangling_references, expected_dangling);
            prop_assert_eq!(
                graph.edge_count() + expected_self + expected_dangling,
                citations.len()
            );
            for edge in graph.edges() {
                prop_assert_ne!(&edge.from, &edge.to);
                prop_assert!(graph.node(&edge.from).is_some());
                prop_assert!(graph.node(&edge.to).is_some());
            }
            prop_assert_eq!(graph.in_degrees().len(), graph.node_count());
        }
    }
}
