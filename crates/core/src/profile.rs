//! Learner profile: who the tutor is talking to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use crate::error::SessionError;

/// English proficiency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(SessionError::InvalidLevel(s.trim().to_string())),
        }
    }
}

/// The learner's stored profile. Read on every turn to build the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub level: Level,
    pub focus_areas: BTreeSet<String>,
    pub native_language: String,
    pub goal: String,
}

impl Default for LearnerProfile {
    fn default() -> Self {
        Self {
            level: Level::Beginner,
            focus_areas: ["grammar", "vocabulary", "conversation"]
                .into_iter()
                .map(String::from)
                .collect(),
            native_language: "vietnamese".into(),
            goal: "general_english".into(),
        }
    }
}
