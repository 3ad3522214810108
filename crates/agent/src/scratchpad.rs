//! Per-turn scratchpad of reasoning steps.
//!
//! Holds every Thought/Action/Observation produced while answering one
//! learner message, renders them back into the reasoning prompt, and
//! counts think calls against the step ceiling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tool call the model asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAction {
    pub tool: String,
    pub input: String,
}

/// One completed act/observe cycle, or a recovered parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// The model's text for this step, as produced
    pub log: String,
    /// The parsed thought
    pub thought: String,
    /// `None` when the step was a recovered parse error
    pub action: Option<ToolAction>,
    pub observation: String,
    pub timestamp: DateTime<Utc>,
}

impl ReasoningStep {
    pub fn acted(log: &str, thought: &str, tool: &str, input: &str, observation: String) -> Self {
        Self {
            log: log.trim().to_string(),
            thought: thought.to_string(),
            action: Some(ToolAction {
                tool: tool.to_string(),
                input: input.to_string(),
            }),
            observation,
            timestamp: Utc::now(),
        }
    }

    pub fn recovered(log: &str, thought: &str, observation: String) -> Self {
        Self {
            log: log.trim().to_string(),
            thought: thought.to_string(),
            action: None,
            observation,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    steps: Vec<ReasoningStep>,
    last_thought: Option<String>,
    think_calls: usize,
    max_think_calls: usize,
}

impl Scratchpad {
    pub fn new(max_think_calls: usize) -> Self {
        Self {
            max_think_calls,
            ..Self::default()
        }
    }

    /// Count a think call. Returns `false` once the ceiling is exceeded.
    pub fn tick(&mut self) -> bool {
        if self.think_calls >= self.max_think_calls {
            return false;
        }
        self.think_calls += 1;
        true
    }

    pub fn note_thought(&mut self, thought: &str) {
        let thought = thought.trim();
        if !thought.is_empty() {
            self.last_thought = Some(thought.to_string());
        }
    }

    pub fn push(&mut self, step: ReasoningStep) {
        self.steps.push(step);
    }

    /// Render for the reasoning prompt, continuing after its trailing `Thought:`.
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|step| format!(" {}\nObservation: {}\nThought:", step.log, step.observation))
            .collect()
    }

    pub fn last_thought(&self) -> Option<&str> {
        self.last_thought.as_deref()
    }

    pub fn think_calls(&self) -> usize {
        self.think_calls
    }

    pub fn steps(&self) -> &[ReasoningStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<ReasoningStep> {
        self.steps
    }
}
