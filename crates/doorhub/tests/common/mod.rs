//! Sinks with fixed behaviour for the integration tests.

use doorhub::{Clock, DispatchOutcome, EventLog, EventLogError};

/// Collects log lines in memory.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: Vec<String>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl EventLog for MemoryEventLog {
    fn append(&mut self, outcome: &DispatchOutcome) -> Result<(), EventLogError> {
        self.entries.push(outcome.log_line());
        Ok(())
    }
}

/// Always returns the same label.
#[derive(Debug, Clone)]
pub struct FixedClock(pub &'static str);

impl Clock for FixedClock {
    fn current_time_label(&self) -> String {
        self.0.to_string()
    }
}
