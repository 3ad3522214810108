//! Domain event system: lets observers (CLI status lines, logs, tests)
//! follow what a tutor session does without coupling to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A conversational turn finished with an answer
    TurnCompleted {
        model: String,
        think_calls: usize,
        tool_calls: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool was invoked by the agent loop
    ToolInvoked {
        tool_name: String,
        duration_ms: u64,
        timed_out: bool,
        timestamp: DateTime<Utc>,
    },

    /// The model's output could not be used and the loop retried
    ReasoningRecovered {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The learner's level was changed
    LevelChanged {
        level: String,
        timestamp: DateTime<Utc>,
    },

    /// The session switched to another model tier
    ModelSwitched {
        tier: String,
        model: String,
        timestamp: DateTime<Utc>,
    },

    /// A turn failed and was answered with an apology
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
