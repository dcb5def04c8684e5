//! Narrow contracts for everything a dispatched frame touches.

use doorhub_frame::DoorState;

use crate::error::EventLogError;

/// What the event log records for one valid frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Whether the single publish attempt succeeded.
    pub published: bool,
    /// Time label from the clock.
    pub timestamp: String,
    pub door_state: DoorState,
    pub sensor_id: u8,
}

impl DispatchOutcome {
    /// Tab-separated log line without the trailing newline:
    /// `<timestamp>\t<OPEN|CLOSED>\tpublishSuc: <YES|NO>`.
    pub fn log_line(&self) -> String {
        format!(
            "{}\t{}\tpublishSuc: {}",
            self.timestamp,
            self.door_state.label(),
            if self.published { "YES" } else { "NO" }
        )
    }
}

/// Local status display. Best-effort; errors are never propagated.
pub trait DisplaySink {
    fn show_valid(
        &mut self,
        sensor_id: u8,
        supply_voltage: u16,
        door_state: DoorState,
    ) -> std::io::Result<()>;

    fn show_rejected(&mut self) -> std::io::Result<()>;
}

/// Append-only persistent log.
pub trait EventLog {
    fn append(&mut self, outcome: &DispatchOutcome) -> Result<(), EventLogError>;
}

/// Source of time labels, assumed already synchronized.
pub trait Clock {
    fn current_time_label(&self) -> String;
}
