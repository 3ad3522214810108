//! Keyword passage index: term-overlap scoring over in-memory chunks.

use async_trait::async_trait;
use parley_core::error::RetrievalError;
use parley_core::retrieval::{Passage, PassageRetriever};
use std::collections::HashSet;

use crate::chunker::chunk_text;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "i",
    "in", "is", "it", "of", "on", "or", "the", "to", "what", "when", "which", "who", "why",
    "with", "you",
];

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

struct IndexedChunk {
    content: String,
    source: Option<String>,
    terms: HashSet<String>,
}

/// An in-memory [`PassageRetriever`] that needs no external service.
#[derive(Default)]
pub struct KeywordIndex {
    chunks: Vec<IndexedChunk>,
}

impl KeywordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunk and index a document.
    pub fn add_document(&mut self, source: Option<&str>, text: &str, size: usize, overlap: usize) {
        let before = self.chunks.len();
        for content in chunk_text(text, size, overlap) {
            self.chunks.push(IndexedChunk {
                terms: terms(&content),
                content,
                source: source.map(String::from),
            });
        }
        tracing::debug!(
            source = source.unwrap_or("<inline>"),
            chunks = self.chunks.len() - before,
            "Indexed document"
        );
    }

    /// Index already-chunked passages.
    pub fn from_chunks(chunks: impl IntoIterator<Item = String>) -> Self {
        let chunks = chunks
            .into_iter()
            .map(|content| IndexedChunk {
                terms: terms(&content),
                content,
                source: None,
            })
            .collect();
        Self { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl PassageRetriever for KeywordIndex {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Passage> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let hits = query_terms.intersection(&chunk.terms).count();
                (hits > 0).then(|| Passage {
                    content: chunk.content.clone(),
                    source: chunk.source.clone(),
                    score: hits as f32 / query_terms.len() as f32,
                })
            })
            .collect();

        // Stable sort keeps corpus order among ties
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}
