//! Citation graph construction and PageRank authority scoring
//!
//! Raw paper and citation records go through [`GraphBuilder`] into a
//! read-only [`CitationGraph`]; [`PageRankSolver`] then runs damped power
//! iteration over it to produce a [`PageRankResult`].

mod graph;
mod pagerank;
mod records;
mod snapshot;
mod stats;

pub use graph::{CitationGraph, Edge, GraphBuilder, Node};
pub use pagerank::{IterationSnapshot, PageRankResult, PageRankSolver, PageRankStats};
pub use records::{CitationRecord, PaperRecord, ParsedData};
pub use stats::{max_abs_delta, total_mass, GraphStats};

pub use citerank_common::PageRankConfig;

use serde::{Deserialize, Serialize};

/// Paper ranked by citation count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRanking {
    pub paper_id: String,

    pub title: String,

    pub year: i32,

    pub authors: Vec<String>,

    /// Number of incoming citations (in-degree)
    pub citations: usize,

    /// Number of outgoing references (out-degree)
    pub references: usize,
}

/// Paper with its PageRank score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperScore {
    pub paper_id: String,

    pub title: String,

    pub year: i32,

    /// Stationary probability mass
    pub score: f64,

    /// Number of incoming citations
    pub citations: usize,
}

/// Neighbourhood of a single paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub node: Node,

    pub in_degree: usize,

    pub out_degree: usize,

    /// Papers this paper cites
    pub cited_papers: Vec<String>,

    /// Papers that cite this paper
    pub citing_papers: Vec<String>,
}

/// Position of a paper under PageRank and under raw citation count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankComparison {
    /// 1-based rank by PageRank score
    pub pagerank_rank: usize,

    /// 1-based rank by citation count
    pub citation_rank: usize,

    pub paper_id: String,

    pub score: f64,

    pub citations: usize,
}
