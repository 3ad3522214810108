//! Tool trait: the abstraction over the tutor's auxiliary capabilities.
//!
//! Tools let the agent answer questions the model cannot answer alone:
//! look things up in the course documents or an encyclopedia, tell the
//! time, or build a calendar link for a practice session.
//!
//! Every tool outcome reaches the agent loop as plain text. Implementors
//! write the fallible [`Tool::try_invoke`]; the provided [`Tool::invoke`]
//! turns any failure into a readable observation.

use async_trait::async_trait;
use std::collections::HashMap;
use crate::error::ToolError;

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "Current Time").
    ///
    /// The reasoning loop selects tools by exact, case-sensitive match on
    /// this name, so it must never change after registration.
    fn name(&self) -> &str;

    /// A natural-language description, shown to the model in the tool catalogue.
    fn description(&self) -> &str;

    /// Run the tool on its raw text input.
    async fn try_invoke(&self, input: &str) -> std::result::Result<String, ToolError>;

    /// Run the tool, never failing: errors come back as text.
    async fn invoke(&self, input: &str) -> String {
        match self.try_invoke(input).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %self.name(), error = %e, "Tool invocation failed");
                format!("Error: {e}")
            }
        }
    }
}

/// A registry of available tools, keyed by name.
///
/// Built once at session construction. Iteration order is registration
/// order so the tool catalogue in prompts is stable.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Whether a tool with exactly this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// `(name, description)` pairs in registration order.
    pub fn catalogue(&self) -> Vec<(&str, &str)> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| (t.name(), t.description()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
