//! ReAct loop: Thought → Action → Observation until a Final Answer.
//!
//! Each think step sends the full reasoning prompt (persona, tool
//! catalogue, windowed history, the learner's message and the scratchpad)
//! as one completion, stopped before the model can write its own
//! `Observation:`. The parsed reply either ends the turn, calls exactly one
//! tool, or is fed back as a format error. Tool calls only happen here,
//! one at a time.
//!
//! The loop is bounded by a ceiling on think calls. When the ceiling is
//! reached the turn still ends with an answer: the last thought the model
//! had, or a generic apology.

use chrono::Utc;
use parley_core::error::{ProviderError, ToolError};
use parley_core::event::{DomainEvent, EventBus};
use parley_core::message::{Message, Turn};
use parley_core::provider::{Provider, ProviderRequest};
use parley_core::tool::ToolRegistry;
use parley_memory::ConversationMemory;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::locale::Locale;
use crate::parser::{self, Decision};
use crate::prompt::build_reasoning_prompt;
use crate::scratchpad::{ReasoningStep, Scratchpad};

/// Stop sequence keeping the model from inventing tool results.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model produced a Final Answer.
    FinalAnswer,
    /// The think-call ceiling was reached.
    StepLimit,
}

/// The result of one agent turn.
#[derive(Debug, Clone)]
pub struct ReactOutcome {
    pub answer: String,
    /// Every act/observe cycle and recovered error, in order
    pub steps: Vec<ReasoningStep>,
    pub think_calls: usize,
    pub tool_calls: usize,
    pub terminated: Termination,
}

/// A tool-using agent bound to one model and persona.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    model: String,
    system_prompt: String,
    tools: Arc<ToolRegistry>,
    event_bus: Arc<EventBus>,
    temperature: f32,
    max_tokens: Option<u32>,
    max_steps: u32,
    llm_timeout: Duration,
    tool_timeout: Duration,
    locale: Locale,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
            tools,
            event_bus,
            temperature: 0.3,
            max_tokens: None,
            max_steps: 8,
            llm_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(20),
            locale: Locale::default(),
        }
    }

    /// Set the ceiling on think calls per turn (at least one).
    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// One think call, bounded by the model timeout.
    async fn think(&self, prompt: String) -> Result<String, ProviderError> {
        let mut request = ProviderRequest::new(&self.model, vec![Message::user(prompt)])
            .with_temperature(self.temperature)
            .with_stop(OBSERVATION_STOP);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = tokio::time::timeout(self.llm_timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "model '{}' did not answer within {}s",
                    self.model,
                    self.llm_timeout.as_secs()
                ))
            })??;

        Ok(response.message.content)
    }

    /// Run one tool, turning a timeout into an observation.
    async fn act(&self, tool_name: &str, input: &str) -> String {
        let Some(tool) = self.tools.get(tool_name) else {
            return format!(
                "{tool_name} is not a valid tool, try one of [{}].",
                self.tools.names().join(", ")
            );
        };

        let start = Instant::now();
        let (observation, timed_out) =
            match tokio::time::timeout(self.tool_timeout, tool.invoke(input)).await {
                Ok(output) => (output, false),
                Err(_) => {
                    warn!(tool = tool_name, "Tool timed out");
                    let error = ToolError::Timeout {
                        tool_name: tool_name.to_string(),
                        timeout_secs: self.tool_timeout.as_secs(),
                    };
                    (format!("Error: {error}"), true)
                }
            };
        let duration_ms = start.elapsed().as_millis() as u64;

        debug!(tool = tool_name, duration_ms, "Tool invoked");
        self.event_bus.publish(DomainEvent::ToolInvoked {
            tool_name: tool_name.to_string(),
            duration_ms,
            timed_out,
            timestamp: Utc::now(),
        });

        observation
    }

    fn recovered(&self, reason: &str) {
        warn!(reason, "ReAct: recovering from unusable model output");
        self.event_bus.publish(DomainEvent::ReasoningRecovered {
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Answer one learner message.
    ///
    /// On success the message and the answer are appended to `memory`.
    /// A model failure or timeout aborts the turn and leaves memory untouched.
    pub async fn run(
        &self,
        input: &str,
        memory: &mut ConversationMemory,
    ) -> Result<ReactOutcome, parley_core::Error> {
        let catalogue = self.tools.catalogue();
        let mut pad = Scratchpad::new(self.max_steps as usize);
        let mut tool_calls = 0usize;

        info!(model = %self.model, max_steps = self.max_steps, "ReAct loop starting");

        let (answer, terminated) = loop {
            if !pad.tick() {
                warn!("ReAct: step ceiling reached ({})", self.max_steps);
                let answer = pad
                    .last_thought()
                    .map(String::from)
                    .unwrap_or_else(|| self.locale.unable_to_complete());
                break (answer, Termination::StepLimit);
            }

            debug!(step = pad.think_calls(), "ReAct think step");

            let prompt = build_reasoning_prompt(
                &self.system_prompt,
                &catalogue,
                memory.windowed_history(),
                input,
                &pad.render(),
            );
            let text = self.think(prompt).await?;
            let parsed = parser::parse(&text);
            pad.note_thought(&parsed.thought);

            match parsed.decision {
                Decision::Final(answer) => break (answer, Termination::FinalAnswer),
                Decision::Act { tool, input: tool_input } => {
                    if self.tools.contains(&tool) {
                        tool_calls += 1;
                    } else {
                        self.recovered(&format!("unknown tool '{tool}'"));
                    }
                    let observation = self.act(&tool, &tool_input).await;
                    pad.push(ReasoningStep::acted(
                        &parsed.log,
                        &parsed.thought,
                        &tool,
                        &tool_input,
                        observation,
                    ));
                }
                Decision::Malformed(reason) => {
                    self.recovered(&reason);
                    let observation = format!(
                        "Invalid format: {reason}. Reply with 'Action:' and 'Action Input:' lines, or with a 'Final Answer:' line."
                    );
                    pad.push(ReasoningStep::recovered(&parsed.log, &parsed.thought, observation));
                }
            }
        };

        memory.append(Turn::user(input));
        memory.append(Turn::assistant(&answer));

        info!(
            think_calls = pad.think_calls(),
            tool_calls,
            ?terminated,
            "ReAct loop completed"
        );
        self.event_bus.publish(DomainEvent::TurnCompleted {
            model: self.model.clone(),
            think_calls: pad.think_calls(),
            tool_calls,
            timestamp: Utc::now(),
        });

        Ok(ReactOutcome {
            answer,
            think_calls: pad.think_calls(),
            tool_calls,
            terminated,
            steps: pad.into_steps(),
        })
    }
}
