//! Per-frame pipeline: decrypt, decode, classify, then fan out.

use doorhub_frame::{decode, open, PresharedKey, RawFrame, TelemetryRecord};
use doorhub_uplink::Uplink;
use doorhub_validate::Validator;

use crate::sink::{Clock, DisplaySink, DispatchOutcome, EventLog};

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Failed validation. Only the display saw it.
    Rejected,
    /// Valid frame; publish attempted and log write attempted.
    Delivered {
        outcome: DispatchOutcome,
        /// Whether the event log accepted the entry.
        logged: bool,
    },
    /// The uplink is halted. No publish, no log write, now or later.
    Halted,
}

impl Dispatch {
    pub fn is_halted(&self) -> bool {
        matches!(self, Dispatch::Halted)
    }
}

/// Owns every collaborator a frame passes through.
pub struct Coordinator<D, U, L, C> {
    key: PresharedKey,
    validator: Validator,
    display: D,
    uplink: U,
    event_log: L,
    clock: C,
}

impl<D, U, L, C> Coordinator<D, U, L, C>
where
    D: DisplaySink,
    U: Uplink,
    L: EventLog,
    C: Clock,
{
    pub fn new(
        key: PresharedKey,
        validator: Validator,
        display: D,
        uplink: U,
        event_log: L,
        clock: C,
    ) -> Self {
        Self {
            key,
            validator,
            display,
            uplink,
            event_log,
            clock,
        }
    }

    /// Run one frame to completion.
    pub fn handle(&mut self, frame: &RawFrame) -> Dispatch {
        if self.uplink.state().is_halted() {
            return Dispatch::Halted;
        }

        let record = decode(&open(frame, &self.key));
        let span = tracing::debug_span!("frame", sensor_id = record.sensor_id, tag = record.tag);
        let _enter = span.enter();

        if !self.validator.classify(&record).is_valid() {
            if let Err(err) = self.display.show_rejected() {
                tracing::warn!(error = %err, "display update failed");
            }
            return Dispatch::Rejected;
        }

        self.deliver(&record)
    }

    fn deliver(&mut self, record: &TelemetryRecord) -> Dispatch {
        let door_state = record.door_state();

        if let Err(err) =
            self.display
                .show_valid(record.sensor_id, record.supply_voltage, door_state)
        {
            tracing::warn!(error = %err, "display update failed");
        }

        if self.uplink.ensure_connected().is_halted() {
            return Dispatch::Halted;
        }

        let published = self.uplink.publish(door_state.label());
        let outcome = DispatchOutcome {
            published,
            timestamp: self.clock.current_time_label(),
            door_state,
            sensor_id: record.sensor_id,
        };

        let logged = match self.event_log.append(&outcome) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "event log write failed");
                false
            }
        };

        tracing::info!(
            door = door_state.label(),
            voltage = record.supply_voltage,
            published,
            logged,
            "door event"
        );

        Dispatch::Delivered { outcome, logged }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn uplink(&self) -> &U {
        &self.uplink
    }

    pub fn event_log(&self) -> &L {
        &self.event_log
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Consume the coordinator and return the sinks.
    pub fn into_parts(self) -> (D, U, L, C) {
        (self.display, self.uplink, self.event_log, self.clock)
    }
}

impl<D, U, L, C> std::fmt::Debug for Coordinator<D, U, L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("key", &self.key)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}
