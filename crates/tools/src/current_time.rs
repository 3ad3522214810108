//! Current time tool: the local date and time at a fixed UTC offset.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use parley_core::error::ToolError;
use parley_core::tool::Tool;
use std::sync::Arc;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct CurrentTimeTool {
    offset: FixedOffset,
    clock: Arc<dyn Clock>,
}

impl CurrentTimeTool {
    pub fn new(offset: FixedOffset) -> Self {
        Self::with_clock(offset, Arc::new(SystemClock))
    }

    pub fn with_clock(offset: FixedOffset, clock: Arc<dyn Clock>) -> Self {
        Self { offset, clock }
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "Current Time"
    }

    fn description(&self) -> &str {
        "Get the current local date and time. Input is ignored."
    }

    async fn try_invoke(&self, _input: &str) -> Result<String, ToolError> {
        let local = self.clock.now().with_timezone(&self.offset);
        Ok(local.format("%A, %d/%m/%Y %H:%M:%S").to_string())
    }
}
