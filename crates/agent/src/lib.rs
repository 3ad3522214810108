//! The tutor's conversational core.
//!
//! A [`TutorSession`] answers learner messages either directly (one
//! completion over the windowed history) or through the [`ReactAgent`],
//! which alternates think steps and tool calls until the model gives a
//! Final Answer:
//!
//! 1. **Build** the reasoning prompt (persona + tools + history + scratchpad)
//! 2. **Think**: one completion, stopped before `Observation:`
//! 3. **Parse** the reply into a Final Answer, an Action, or a format error
//! 4. **Act**: run the named tool and append its observation, then loop
//!
//! The loop ends on a Final Answer or when the think-call ceiling is hit.

pub mod locale;
pub mod parser;
pub mod prompt;
pub mod react;
pub mod scratchpad;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use locale::Locale;
pub use parser::{Decision, ParsedStep};
pub use react::{OBSERVATION_STOP, ReactAgent, ReactOutcome, Termination};
pub use scratchpad::{ReasoningStep, Scratchpad, ToolAction};
pub use session::{AgentMode, TutorSession};
