//! Paper and citation records handed over by the ingester

use serde::{Deserialize, Deserializer, Serialize};

/// Paper metadata as produced by ingestion
///
/// Extra fields in the ingester's output (abstracts, DOIs, embeddings)
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub year: i32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
}

impl PaperRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, year: i32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            year,
            authors: Vec::new(),
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }
}

/// A raw "from cites to" pair, not yet checked against the paper set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitationRecord {
    pub from: String,
    pub to: String,
}

impl CitationRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything the ingester hands over in one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub papers: Vec<PaperRecord>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub citations: Vec<CitationRecord>,
}
