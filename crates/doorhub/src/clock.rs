use chrono::format::{Item, StrftimeItems};
use chrono::Local;

use crate::error::ClockError;
use crate::sink::Clock;

/// Time-of-day, as shown in the event log.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Local wall clock rendered with a strftime pattern.
#[derive(Debug, Clone)]
pub struct SystemClock {
    format: String,
}

impl SystemClock {
    /// Create a clock with a validated strftime pattern.
    pub fn new(format: impl Into<String>) -> Result<Self, ClockError> {
        let format = format.into();
        if format.is_empty() || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ClockError::InvalidFormat(format));
        }
        Ok(Self { format })
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl Clock for SystemClock {
    fn current_time_label(&self) -> String {
        Local::now().format(&self.format).to_string()
    }
}

/// Always returns the same label.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FixedClock(pub String);

#[cfg(test)]
impl FixedClock {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn current_time_label(&self) -> String {
        self.0.clone()
    }
}
