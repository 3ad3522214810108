//! Windowed conversation memory.
//!
//! Every turn is kept; the window is applied when history is read, so
//! the full transcript stays available.

use parley_core::message::{Message, Turn};
use serde::{Deserialize, Serialize};

/// Ordered turn history for one tutor session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
    /// Turn-pairs visible to the model
    window: usize,
}

impl ConversationMemory {
    /// Create an empty memory exposing the last `window` turn-pairs.
    ///
    /// A window of zero is raised to one.
    pub fn new(window: usize) -> Self {
        Self {
            turns: Vec::new(),
            window: window.max(1),
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The last `2 * window` turns, oldest first.
    pub fn windowed_history(&self) -> &[Turn] {
        let visible = self.window.saturating_mul(2);
        let start = self.turns.len().saturating_sub(visible);
        &self.turns[start..]
    }

    /// Windowed history as provider messages.
    pub fn windowed_messages(&self) -> Vec<Message> {
        self.windowed_history().iter().map(Turn::to_message).collect()
    }

    pub fn full_history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(5)
    }
}
