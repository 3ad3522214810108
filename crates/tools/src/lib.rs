//! Tutor tool implementations for Parley.
//!
//! Tools let the agent reach past the model's own knowledge: search the
//! course documents, look up a topic in an encyclopedia, tell the local
//! time, and build a calendar link for a practice session.

pub mod calendar_link;
pub mod current_time;
pub mod document_retrieval;
pub mod knowledge_lookup;
pub mod wikipedia;

pub use calendar_link::CalendarLinkTool;
pub use current_time::{Clock, CurrentTimeTool, FixedClock, SystemClock};
pub use document_retrieval::DocumentRetrievalTool;
pub use knowledge_lookup::KnowledgeLookupTool;
pub use wikipedia::WikipediaSource;

use chrono::FixedOffset;
use parley_core::error::ToolError;
use parley_core::retrieval::{KnowledgeSource, PassageRetriever};
use parley_core::tool::ToolRegistry;
use std::sync::Arc;

/// Tuning for the lookup tools.
#[derive(Debug, Clone, Copy)]
pub struct ToolLimits {
    /// Passages returned per document query
    pub top_k: usize,
    /// Maximum knowledge summary length in characters
    pub summary_chars: usize,
    /// Candidates listed for an ambiguous lookup
    pub max_candidates: usize,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            top_k: 3,
            summary_chars: 500,
            max_candidates: 5,
        }
    }
}

/// Create the tutor's tool registry with all four tools.
pub fn default_registry(
    retriever: Arc<dyn PassageRetriever>,
    knowledge: Arc<dyn KnowledgeSource>,
    offset: FixedOffset,
    limits: ToolLimits,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(DocumentRetrievalTool::new(retriever, limits.top_k)))?;
    registry.register(Box::new(KnowledgeLookupTool::new(
        knowledge,
        limits.summary_chars,
        limits.max_candidates,
    )))?;
    registry.register(Box::new(CurrentTimeTool::new(offset)))?;
    registry.register(Box::new(CalendarLinkTool::new(offset)))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_core::error::RetrievalError;
    use parley_core::retrieval::KnowledgeOutcome;
    use parley_memory::KeywordIndex;

    struct NothingKnown;

    #[async_trait]
    impl KnowledgeSource for NothingKnown {
        fn name(&self) -> &str {
            "nothing"
        }

        async fn lookup(&self, _query: &str) -> Result<KnowledgeOutcome, RetrievalError> {
            Ok(KnowledgeOutcome::NotFound)
        }
    }

    #[test]
    fn default_registry_has_four_tools_in_order() {
        let registry = default_registry(
            Arc::new(KeywordIndex::new()),
            Arc::new(NothingKnown),
            FixedOffset::east_opt(7 * 3600).unwrap(),
            ToolLimits::default(),
        )
        .unwrap();
        assert_eq!(
            registry.names(),
            vec!["Document Retrieval", "Knowledge Lookup", "Current Time", "Calendar Link"]
        );
        for (_, description) in registry.catalogue() {
            assert!(!description.is_empty());
        }
    }
}
