//! Parser for the model's reasoning text.
//!
//! The model continues the reasoning prompt after `Thought:` and is expected
//! to produce either
//!
//! ```text
//! <thought>
//! Action: <tool name>
//! Action Input: <input>
//! ```
//!
//! or
//!
//! ```text
//! <thought>
//! Final Answer: <reply>
//! ```

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const OBSERVATION: &str = "Observation:";

/// What the model decided to do this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Reply to the learner.
    Final(String),
    /// Call a tool.
    Act { tool: String, input: String },
    /// The text follows neither shape.
    Malformed(String),
}

/// One parsed think step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStep {
    /// The part of the raw text that belongs to this step
    pub log: String,
    pub thought: String,
    pub decision: Decision,
}

/// Byte offset of `label` where it starts a line.
fn find_line_label(text: &str, label: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        if line[indent..].starts_with(label) {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

fn clean_thought(text: &str) -> String {
    let text = text.trim();
    text.strip_prefix("Thought:").unwrap_or(text).trim().to_string()
}

fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .filter(|t| !t.contains('"'))
        .unwrap_or(text)
}

/// Parse raw model output into a thought and a decision.
///
/// Labels are only looked for ahead of a `Final Answer:`; the answer
/// itself is free text.
pub fn parse(raw: &str) -> ParsedStep {
    let final_at = find_line_label(raw, FINAL_ANSWER).or_else(|| raw.find(FINAL_ANSWER));
    let reasoning_end = final_at.unwrap_or(raw.len());

    // Anything after an invented observation is not the model's to write
    let (text, final_at) = match find_line_label(&raw[..reasoning_end], OBSERVATION) {
        Some(pos) => (&raw[..pos], None),
        None => (raw, final_at),
    };
    let action_at = find_line_label(&text[..final_at.unwrap_or(text.len())], ACTION);
    let log = text.trim_end().to_string();

    let (thought, decision) = match (action_at, final_at) {
        (Some(action_at), Some(_)) => (
            clean_thought(&text[..action_at]),
            Decision::Malformed(
                "the reply contains both an Action and a Final Answer; give only one".into(),
            ),
        ),
        (Some(action_at), None) => parse_action(text, action_at),
        (None, Some(final_at)) => {
            let answer = text[final_at + FINAL_ANSWER.len()..].trim().to_string();
            let decision = if answer.is_empty() {
                Decision::Malformed("the Final Answer is empty".into())
            } else {
                Decision::Final(answer)
            };
            (clean_thought(&text[..final_at]), decision)
        }
        (None, None) => (
            clean_thought(text),
            Decision::Malformed("missing 'Action:' or 'Final Answer:' after the thought".into()),
        ),
    };

    ParsedStep {
        log,
        thought,
        decision,
    }
}

fn parse_action(text: &str, action_at: usize) -> (String, Decision) {
    let thought = clean_thought(&text[..action_at]);
    let after_action = &text[action_at + ACTION.len()..];

    let Some(input_at) = find_line_label(after_action, ACTION_INPUT) else {
        return (
            thought,
            Decision::Malformed("missing 'Action Input:' after 'Action:'".into()),
        );
    };

    let tool = after_action[..input_at]
        .trim()
        .trim_matches(|c| c == '`' || c == '[' || c == ']')
        .trim()
        .to_string();
    let input = strip_quotes(&after_action[input_at + ACTION_INPUT.len()..]).to_string();

    let decision = if tool.is_empty() {
        Decision::Malformed("'Action:' does not name a tool".into())
    } else {
        Decision::Act { tool, input }
    };
    (thought, decision)
}
