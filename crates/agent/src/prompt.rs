//! Prompt composition.
//!
//! Three prompts are built here:
//! - the tutor's system prompt, derived from the learner profile
//! - the reasoning prompt for each think step of the agent loop,
//!   assembled from named [`Slot`]s over a fixed template
//! - the one-shot text analysis prompt
//!
//! All builders are pure: the same inputs always produce the same text.

use parley_core::message::Turn;
use parley_core::profile::{LearnerProfile, Level};

/// System message for text analysis requests.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are an English-language analysis expert.";

/// How the tutor pitches its English at each level.
pub fn level_calibration(level: Level) -> &'static str {
    match level {
        Level::Beginner => "use simple vocabulary and basic grammar",
        Level::Intermediate => "use more complex sentence structures and varied vocabulary",
        Level::Advanced => "discuss complex topics using nuanced, sophisticated language",
    }
}

/// "vietnamese" -> "Vietnamese"
fn display_language(language: &str) -> String {
    let language = language.trim();
    let mut chars = language.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "English".into(),
    }
}

/// "general_english" -> "general english"
fn display_goal(goal: &str) -> String {
    goal.trim().replace('_', " ")
}

/// Build the tutor persona for a learner.
pub fn build_system_prompt(profile: &LearnerProfile) -> String {
    let language = display_language(&profile.native_language);
    let focus = if profile.focus_areas.is_empty() {
        "general English".to_string()
    } else {
        profile
            .focus_areas
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "You are a friendly and patient AI English tutor.

Your learner:
- Level: {level} ({calibration})
- Native language: {language}
- Goal: {goal}
- Focus areas: {focus}

Your job:
1. Hold a natural conversation in English with the learner
2. Match the difficulty to the learner's level: {calibration}
3. Correct mistakes gently and explain the correction clearly
4. Encourage and motivate the learner
5. Give concrete suggestions for improvement
6. If the learner writes in {language}, encourage them to try saying it in English

Style:
- Friendly and patient
- Use real-life examples
- Explain in both English and {language} when it helps
- Ask follow-up questions to keep the conversation going",
        level = profile.level,
        calibration = level_calibration(profile.level),
        goal = display_goal(&profile.goal),
    )
}

/// Build the analysis request for a piece of learner text.
pub fn build_analysis_prompt(text: &str, native_language: &str) -> String {
    let language = display_language(native_language);
    format!(
        "Analyze this English text written by a learner:

Text: \"{text}\"

Provide:
1. Grammar errors (if any) and how to fix them
2. Better vocabulary suggestions
3. Improvements to sentence structure
4. An overall score (1-10)
5. A few words of encouragement

Answer in {language} so the learner can follow easily."
    )
}

/// A named hole in the reasoning template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The tutor persona
    System,
    /// One "name: description" line per tool
    ToolCatalogue,
    /// Comma-separated tool names
    ToolNames,
    /// Windowed conversation history
    History,
    /// The learner's current message
    Input,
    /// Thought/Action/Observation steps so far this turn
    Scratchpad,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::System,
        Slot::ToolCatalogue,
        Slot::ToolNames,
        Slot::History,
        Slot::Input,
        Slot::Scratchpad,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::System => "system",
            Slot::ToolCatalogue => "tool_catalogue",
            Slot::ToolNames => "tool_names",
            Slot::History => "history",
            Slot::Input => "input",
            Slot::Scratchpad => "scratchpad",
        }
    }

    fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

const REASONING_TEMPLATE: &str = "{system}

You can use the following tools to help the learner:

{tool_catalogue}

Use this format:

Question: the learner's message you must reply to
Thought: think about what to do next
Action: the tool to use, exactly one of [{tool_names}]
Action Input: the input for the tool
Observation: the result of the tool
... (Thought/Action/Action Input/Observation can repeat)
Thought: I now know how to reply
Final Answer: your reply to the learner

Only use a tool when you need information you do not already have. \
If no tool is needed, go straight to the Final Answer.

Conversation so far:
{history}

Question: {input}
Thought:{scratchpad}";

/// Values for every [`Slot`] of the reasoning template.
#[derive(Debug, Clone)]
pub struct ReasoningSlots {
    values: [String; 6],
}

impl ReasoningSlots {
    pub fn new(
        system: &str,
        catalogue: &[(&str, &str)],
        history: &[Turn],
        input: &str,
        scratchpad: &str,
    ) -> Self {
        let tool_catalogue = if catalogue.is_empty() {
            "(no tools available)".to_string()
        } else {
            catalogue
                .iter()
                .map(|(name, description)| format!("{name}: {description}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let tool_names = catalogue
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            values: [
                system.to_string(),
                tool_catalogue,
                tool_names,
                render_history(history),
                input.trim().to_string(),
                scratchpad.to_string(),
            ],
        }
    }

    pub fn get(&self, slot: Slot) -> &str {
        &self.values[slot as usize]
    }

    /// Substitute every slot in a single pass over the template, so slot
    /// values that happen to contain `{...}` are never expanded.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(REASONING_TEMPLATE.len() + self.values.iter().map(String::len).sum::<usize>());
        let mut rest = REASONING_TEMPLATE;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}').and_then(|close| Some((close, Slot::from_key(&after[..close])?))) {
                Some((close, slot)) => {
                    out.push_str(self.get(slot));
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn render_history(history: &[Turn]) -> String {
    if history.is_empty() {
        return "(no previous messages)".into();
    }
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role().label(), turn.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the reasoning prompt for one think step.
pub fn build_reasoning_prompt(
    system: &str,
    catalogue: &[(&str, &str)],
    history: &[Turn],
    input: &str,
    scratchpad: &str,
) -> String {
    ReasoningSlots::new(system, catalogue, history, input, scratchpad).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_carries_level_calibration() {
        for level in Level::ALL {
            let profile = LearnerProfile {
                level,
                ..LearnerProfile::default()
            };
            let prompt = build_system_prompt(&profile);
            assert!(prompt.contains(level_calibration(level)));
            assert!(prompt.contains(&format!("Level: {level}")));
        }
    }

    #[test]
    fn system_prompt_is_deterministic() {
        let profile = LearnerProfile::default();
        assert_eq!(build_system_prompt(&profile), build_system_prompt(&profile));
    }

    #[test]
    fn system_prompt_uses_native_language() {
        let prompt = build_system_prompt(&LearnerProfile::default());
        assert!(prompt.contains("Native language: Vietnamese"));
        assert!(prompt.contains("both English and Vietnamese"));
        assert!(prompt.contains("Goal: general english"));
        assert!(prompt.contains("tutor"));
    }

    #[test]
    fn analysis_prompt_asks_for_score_in_native_language() {
        let prompt = build_analysis_prompt("I goes to school", "vietnamese");
        assert!(prompt.contains("\"I goes to school\""));
        assert!(prompt.contains("(1-10)"));
        assert!(prompt.contains("Answer in Vietnamese"));
    }

    #[test]
    fn reasoning_prompt_fills_every_slot() {
        let history = vec![Turn::user("Hi!"), Turn::assistant("Hello! How are you?")];
        let prompt = build_reasoning_prompt(
            "SYSTEM PERSONA",
            &[("Current Time", "Get the time."), ("Calendar Link", "Make a link.")],
            &history,
            "What time is it?",
            " I should check.\nObservation: 10:00\nThought:",
        );

        assert!(prompt.starts_with("SYSTEM PERSONA"));
        assert!(prompt.contains("Current Time: Get the time.\nCalendar Link: Make a link."));
        assert!(prompt.contains("exactly one of [Current Time, Calendar Link]"));
        assert!(prompt.contains("Learner: Hi!\nTutor: Hello! How are you?"));
        assert!(prompt.contains("Question: What time is it?"));
        assert!(prompt.ends_with("Thought: I should check.\nObservation: 10:00\nThought:"));
        for slot in Slot::ALL {
            assert!(!prompt.contains(&format!("{{{}}}", slot.key())));
        }
    }

    #[test]
    fn slot_values_are_not_expanded() {
        let prompt = build_reasoning_prompt("sys", &[], &[], "what is {history}?", "");
        assert!(prompt.contains("Question: what is {history}?"));
        assert!(prompt.contains("(no previous messages)"));
        assert!(prompt.contains("(no tools available)"));
    }

    #[test]
    fn empty_scratchpad_ends_on_thought() {
        let prompt = build_reasoning_prompt("sys", &[], &[], "hello", "");
        assert!(prompt.ends_with("Question: hello\nThought:"));
    }
}
