//! Message and Turn domain types.
//!
//! [`Turn`] is what the tutor remembers about a conversation: who spoke and
//! what they said. [`Message`] is the wire-level unit sent to a language
//! model, which also needs a system role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, rules)
    System,
    /// The learner
    User,
    /// The tutor
    Assistant,
}

/// A single message in a provider request or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }
}

/// Speaker of a remembered conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn label(self) -> &'static str {
        match self {
            TurnRole::User => "Learner",
            TurnRole::Assistant => "Tutor",
        }
    }
}

/// One remembered utterance. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: TurnRole,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Convert into a provider message for memory-threaded completions.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.content),
            TurnRole::Assistant => Message::assistant(&self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, tutor!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, tutor!");
    }

    #[test]
    fn turn_converts_to_matching_message_role() {
        let turn = Turn::assistant("Nice sentence!");
        let msg = turn.to_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "Nice sentence!");

        assert_eq!(Turn::user("hi").to_message().role, Role::User);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
