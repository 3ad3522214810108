//! Lookup services the tools delegate to.
//!
//! - [`PassageRetriever`]: nearest-passage search over a pre-chunked corpus.
//! - [`KnowledgeSource`]: short factual lookups in a reference service.
//!
//! Both are external collaborators; the tool adapters only shape queries
//! and format results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// A chunk of the reference corpus returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// The chunk text
    pub content: String,

    /// Where the chunk came from (file name, document title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Similarity to the query (higher is closer)
    #[serde(default)]
    pub score: f32,
}

/// Nearest-passage search.
#[async_trait]
pub trait PassageRetriever: Send + Sync {
    /// The backend name (e.g., "keyword", "embedding").
    fn name(&self) -> &str;

    /// Return at most `k` passages, most similar first.
    async fn nearest(&self, query: &str, k: usize) -> std::result::Result<Vec<Passage>, RetrievalError>;
}

/// What a knowledge lookup found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KnowledgeOutcome {
    /// A single matching entry.
    Found { title: String, summary: String },
    /// Nothing matched the query.
    NotFound,
    /// The query matches several entries.
    Ambiguous { candidates: Vec<String> },
}

/// A reference service answering short factual queries.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, query: &str) -> std::result::Result<KnowledgeOutcome, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_outcome_is_tagged() {
        let outcome = KnowledgeOutcome::Ambiguous {
            candidates: vec!["Mercury (planet)".into(), "Mercury (element)".into()],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"ambiguous\""));
        assert!(json.contains("Mercury (planet)"));
    }

    #[test]
    fn passage_source_is_optional() {
        let passage: Passage = serde_json::from_str(r#"{"content":"Present perfect"}"#).unwrap();
        assert!(passage.source.is_none());
        assert_eq!(passage.score, 0.0);
    }
}
