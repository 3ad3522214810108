//! Embedding passage index ranked by cosine similarity.

use async_trait::async_trait;
use parley_core::error::RetrievalError;
use parley_core::provider::{EmbeddingRequest, Provider};
use parley_core::retrieval::{Passage, PassageRetriever};
use std::sync::Arc;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

struct EmbeddedChunk {
    passage: Passage,
    embedding: Vec<f32>,
}

/// A [`PassageRetriever`] over chunks embedded once at build time.
///
/// Queries are embedded with the same provider and model.
pub struct EmbeddingIndex {
    provider: Arc<dyn Provider>,
    model: String,
    chunks: Vec<EmbeddedChunk>,
}

impl EmbeddingIndex {
    /// Embed `passages` and build the index.
    pub async fn build(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        passages: Vec<Passage>,
    ) -> Result<Self, RetrievalError> {
        let model = model.into();
        let chunks = if passages.is_empty() {
            Vec::new()
        } else {
            let request = EmbeddingRequest {
                model: model.clone(),
                inputs: passages.iter().map(|p| p.content.clone()).collect(),
            };
            let response = provider
                .embed(request)
                .await
                .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

            if response.embeddings.len() != passages.len() {
                return Err(RetrievalError::Indexing(format!(
                    "expected {} embeddings, got {}",
                    passages.len(),
                    response.embeddings.len()
                )));
            }

            passages
                .into_iter()
                .zip(response.embeddings)
                .map(|(passage, embedding)| EmbeddedChunk { passage, embedding })
                .collect()
        };

        tracing::info!(model = %model, chunks = chunks.len(), "Built embedding index");
        Ok(Self {
            provider,
            model,
            chunks,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl PassageRetriever for EmbeddingIndex {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![query.to_string()],
            })
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        let query_embedding = response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::QueryFailed("empty embedding response".into()))?;

        let mut scored: Vec<Passage> = self
            .chunks
            .iter()
            .map(|chunk| {
                let mut passage = chunk.passage.clone();
                passage.score = cosine_similarity(&chunk.embedding, &query_embedding);
                passage
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}
