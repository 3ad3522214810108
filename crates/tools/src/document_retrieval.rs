//! Document retrieval tool: nearest passages from the course corpus.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::retrieval::PassageRetriever;
use parley_core::tool::Tool;
use std::sync::Arc;

pub struct DocumentRetrievalTool {
    retriever: Arc<dyn PassageRetriever>,
    top_k: usize,
}

impl DocumentRetrievalTool {
    pub fn new(retriever: Arc<dyn PassageRetriever>, top_k: usize) -> Self {
        Self {
            retriever,
            top_k: top_k.max(1),
        }
    }
}

#[async_trait]
impl Tool for DocumentRetrievalTool {
    fn name(&self) -> &str {
        "Document Retrieval"
    }

    fn description(&self) -> &str {
        "Search the English course documents for grammar rules, vocabulary lists and lesson notes. \
         Input: a short search query. Returns the most relevant passages."
    }

    async fn try_invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim().trim_matches('"').trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments(
                "Document Retrieval needs a non-empty search query".into(),
            ));
        }

        let passages = self
            .retriever
            .nearest(query, self.top_k)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        tracing::debug!(
            retriever = self.retriever.name(),
            query,
            hits = passages.len(),
            "Document retrieval"
        );

        if passages.is_empty() {
            return Ok(format!("No relevant passages found in the documents for '{query}'."));
        }

        Ok(passages
            .into_iter()
            .map(|p| p.content)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
