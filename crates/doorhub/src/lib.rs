//! Door sensor hub.
//!
//! Receives encrypted door-contact telemetry over a short-range radio,
//! recovers and validates each record, and fans it out to three sinks with
//! different failure policies:
//!
//! | Sink | Failure policy |
//! |---|---|
//! | display | best-effort, swallowed |
//! | uplink | bounded connect retry, then process-fatal `Halted` |
//! | event log | reported, never fatal; written whether or not publish succeeded |
//!
//! # Crate Structure
//!
//! - [`radio`]: Fixed-size frame sources
//! - [`frame`]: Keystream cipher and record codec
//! - [`validate`]: Tag-based record classification
//! - [`uplink`]: MQTT session and connectivity manager
//! - [`dispatch`]: Per-frame pipeline
//! - [`hub`]: Single-threaded receive loop

pub mod clock;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod event_log;
pub mod hub;
pub mod sink;

pub use clock::{SystemClock, DEFAULT_TIME_FORMAT};
pub use dispatch::{Coordinator, Dispatch};
pub use display::{TextDisplay, REJECTED_MESSAGE};
pub use error::{ClockError, EventLogError, HubError};
pub use event_log::{FileEventLog, DEFAULT_LOG_FILE};
pub use hub::{Hub, HubConfig, HubExit, HubStats};
pub use sink::{Clock, DisplaySink, DispatchOutcome, EventLog};

/// Re-export radio types.
pub mod radio {
    pub use doorhub_radio::*;
}

/// Re-export frame types.
pub mod frame {
    pub use doorhub_frame::*;
}

/// Re-export validation types.
pub mod validate {
    pub use doorhub_validate::*;
}

/// Re-export uplink types.
pub mod uplink {
    pub use doorhub_uplink::*;
}
