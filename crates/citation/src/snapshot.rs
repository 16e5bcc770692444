//! JSON snapshots of graphs and PageRank results
//!
//! All maps are ordered, so serializing a loaded snapshot reproduces the
//! original bytes.

use citerank_common::errors::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::graph::{CitationGraph, RawGraph};
use crate::pagerank::PageRankResult;
use crate::records::ParsedData;

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, &json)?;

    debug!(path = %path.display(), bytes = json.len(), "Snapshot written");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

impl CitationGraph {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, re-checking every graph invariant
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawGraph = serde_json::from_str(json)?;
        CitationGraph::try_from(raw)
    }

    /// Write the graph snapshot, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(self, path.as_ref())
    }

    /// Load a graph snapshot written by [`CitationGraph::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw: RawGraph = read_json(path.as_ref())?;
        CitationGraph::try_from(raw)
    }
}

impl PageRankResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(self, path.as_ref())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }
}

impl ParsedData {
    /// Load the ingester's output file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagerank::PageRankSolver;
    use crate::records::{CitationRecord, PaperRecord};
    use citerank_common::errors::{AppError, ErrorCode};
    use citerank_common::PageRankConfig;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn sample_graph() -> CitationGraph {
        let papers = vec![
            PaperRecord::new("A", "Alpha", 2019).with_authors(["Ada", "Bo"]),
            PaperRecord::new("B", "Beta", 2020),
            PaperRecord::new("C", "Gamma", 2021),
        ];
        let citations = vec![
            CitationRecord::new("A", "B"),
            CitationRecord::new("C", "B"),
            CitationRecord::new("B", "A"),
            CitationRecord::new("C", "C"),
            CitationRecord::new("C", "Z"),
        ];
        CitationGraph::build(&papers, &citations).unwrap()
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("citerank-{}-{}", std::process::id(), name))
            .join("nested")
            .join("snapshot.json")
    }

    #[test]
    fn test_graph_round_trip_is_byte_identical() {
        let graph = sample_graph();
        let json = graph.to_json().unwrap();

        let restored = CitationGraph::from_json(&json).unwrap();
        assert_eq!(restored, graph);
        assert_eq!(restored.to_json().unwrap(), json);
        assert_eq!(restored.position("C"), Some(2));
    }

    #[test]
    fn test_graph_deserializes_through_serde() {
        let graph = sample_graph();
        let json = graph.to_json().unwrap();
        let restored: CitationGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_pagerank_round_trip_is_byte_identical() {
        let graph = sample_graph();
        let result = PageRankSolver::new(PageRankConfig::default())
            .unwrap()
            .solve(&graph)
            .unwrap();
        let json = result.to_json().unwrap();

        let restored = PageRankResult::from_json(&json).unwrap();
        assert_eq!(restored, result);
        assert_eq!(restored.to_json().unwrap(), json);
    }

    #[test]
    fn test_save_and_load_files() {
        let graph = sample_graph();
        let graph_path = scratch_path("graph");
        graph.save(&graph_path).unwrap();
        assert_eq!(CitationGraph::load(&graph_path).unwrap(), graph);

        let result = PageRankSolver::new(PageRankConfig::default())
            .unwrap()
            .solve(&graph)
            .unwrap();
        let result_path = scratch_path("pagerank");
        result.save(&result_path).unwrap();
        assert_eq!(PageRankResult::load(&result_path).unwrap(), result);

        for path in [graph_path, result_path] {
            if let Some(root) = path.parent().and_then(Path::parent) {
                let _ = fs::remove_dir_all(root);
            }
        }
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let graph = sample_graph();
        let mut value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        value["out_degree"]["A"] = serde_json::json!(5);

        let err = CitationGraph::from_json(&value.to_string()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InconsistentSnapshot);
    }

    #[test]
    fn test_tampered_stats_rejected() {
        let graph = sample_graph();
        let json = graph.to_json().unwrap();

        let tampered = [
            ("avg_in_degree", serde_json::json!(42.5)),
            ("max_in_degree", serde_json::json!(99)),
            ("most_cited_paper", serde_json::json!("nobody")),
            ("isolated_nodes", serde_json::json!(7)),
            ("graph_density", serde_json::json!(0.99)),
        ];
        for (field, bogus) in tampered {
            let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
            value["stats"][field] = bogus;

            let err = CitationGraph::from_json(&value.to_string()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InconsistentSnapshot, "field {field}");
        }

        // Build counters cannot be re-derived and load as recorded
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["stats"]["self_citations"] = serde_json::json!(3);
        let loaded = CitationGraph::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.stats().self_citations, 3);
    }

    #[test]
    fn test_snapshot_with_self_loop_rejected() {
        let graph = sample_graph();
        let mut value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        value["edges"][0] = serde_json::json!({"from": "A", "to": "A"});

        let err = CitationGraph::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, AppError::InconsistentSnapshot { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ParsedData::load("/nonexistent/citerank/papers.json").unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoError);
    }
}
