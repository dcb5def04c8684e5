//! Frame payload handling for door sensor telemetry.
//!
//! Two independent pieces live here:
//! - [`cipher`]: a stateless keystream transform keyed by a pre-shared key
//! - [`codec`]: the fixed 32-byte little-endian telemetry record layout
//!
//! ```text
//! ┌───────────┬────────────┬───────────┬─────────────┬──────────────┐
//! │ Tag (2B)  │ Door (1B)  │ Sensor    │ Supply mV   │ Reserved     │
//! │ u16 LE    │ 0 = closed │ (1B)      │ (2B LE)     │ (26B)        │
//! └───────────┴────────────┴───────────┴─────────────┴──────────────┘
//! ```
//!
//! Neither piece validates anything. Deciding whether a decrypted record is
//! genuine is the job of `doorhub-validate`.

pub mod cipher;
pub mod codec;
pub mod error;

pub use cipher::{open, seal, transform, transform_in_place, PresharedKey};
pub use codec::{
    decode, decode_slice, encode, DoorState, TelemetryRecord, RECORD_SIZE, RESERVED_SIZE,
};
pub use doorhub_radio::{RawFrame, FRAME_SIZE};
pub use error::{FrameError, Result};
