//! Knowledge lookup tool: a short encyclopedia summary for a topic.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::retrieval::{KnowledgeOutcome, KnowledgeSource};
use parley_core::tool::Tool;
use std::sync::Arc;

pub struct KnowledgeLookupTool {
    source: Arc<dyn KnowledgeSource>,
    summary_chars: usize,
    max_candidates: usize,
}

impl KnowledgeLookupTool {
    pub fn new(source: Arc<dyn KnowledgeSource>, summary_chars: usize, max_candidates: usize) -> Self {
        Self {
            source,
            summary_chars,
            max_candidates,
        }
    }
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl Tool for KnowledgeLookupTool {
    fn name(&self) -> &str {
        "Knowledge Lookup"
    }

    fn description(&self) -> &str {
        "Look up a topic, person, place or idiom in the encyclopedia. \
         Input: the topic name. Returns a short summary."
    }

    async fn try_invoke(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim().trim_matches('"').trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArguments(
                "Knowledge Lookup needs a topic to look up".into(),
            ));
        }

        let outcome = self
            .source
            .lookup(query)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(match outcome {
            KnowledgeOutcome::Found { title, summary } => {
                let summary = truncate_chars(summary.trim(), self.summary_chars);
                format!("{title}: {summary}")
            }
            KnowledgeOutcome::NotFound => {
                format!("No encyclopedia entry found for '{query}'.")
            }
            KnowledgeOutcome::Ambiguous { candidates } => {
                let shown: Vec<&str> = candidates
                    .iter()
                    .take(self.max_candidates)
                    .map(String::as_str)
                    .collect();
                format!(
                    "'{query}' is ambiguous. Possible topics: {}",
                    shown.join(", ")
                )
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::error::RetrievalError;

    struct ScriptedSource(KnowledgeOutcome);

    #[async_trait]
    impl KnowledgeSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn lookup(&self, _query: &str) -> Result<KnowledgeOutcome, RetrievalError> {
            Ok(self.0.clone())
        }
    }

    fn tool(outcome: KnowledgeOutcome) -> KnowledgeLookupTool {
        KnowledgeLookupTool::new(Arc::new(ScriptedSource(outcome)), 500, 5)
    }

    #[tokio::test]
    async fn found_summary_is_truncated() {
        let long = "é".repeat(800);
        let output = tool(KnowledgeOutcome::Found {
            title: "Accent".into(),
            summary: long,
        })
        .invoke("accent")
        .await;
        assert!(output.starts_with("Accent: "));
        assert_eq!(output.chars().count(), "Accent: ".len() + 500);
    }

    #[tokio::test]
    async fn not_found_is_reported() {
        let output = tool(KnowledgeOutcome::NotFound).invoke("Xyzzyq").await;
        assert!(output.contains("No encyclopedia entry"));
        assert!(output.contains("Xyzzyq"));
    }

    #[tokio::test]
    async fn ambiguous_lists_at_most_five_candidates() {
        let candidates = (1..=8).map(|i| format!("Mercury {i}")).collect();
        let output = tool(KnowledgeOutcome::Ambiguous { candidates })
            .invoke("Mercury")
            .await;
        assert!(output.contains("ambiguous"));
        assert!(output.contains("Mercury 5"));
        assert!(!output.contains("Mercury 6"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
