use bytes::{Buf, BufMut};
use doorhub_radio::{RawFrame, FRAME_SIZE};

use crate::error::{FrameError, Result};

/// Padding that brings the record up to the radio frame size.
pub const RESERVED_SIZE: usize = 26;

/// Encoded record size: tag (2) + door (1) + sensor (1) + voltage (2) + reserved (26).
pub const RECORD_SIZE: usize = 2 + 1 + 1 + 2 + RESERVED_SIZE;

const _: () = assert!(RECORD_SIZE == FRAME_SIZE);

/// Door contact state reported by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorState {
    Closed,
    Open,
}

impl DoorState {
    /// Interpret the raw state byte. Any non-zero value means open.
    pub fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            DoorState::Closed
        } else {
            DoorState::Open
        }
    }

    /// Canonical wire value.
    pub fn as_raw(self) -> u8 {
        match self {
            DoorState::Closed => 0,
            DoorState::Open => 1,
        }
    }

    /// Upper-case label used on the display, the uplink and the event log.
    pub fn label(self) -> &'static str {
        match self {
            DoorState::Closed => "CLOSED",
            DoorState::Open => "OPEN",
        }
    }
}

impl std::fmt::Display for DoorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for DoorState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" | "1" => Ok(DoorState::Open),
            "closed" | "0" => Ok(DoorState::Closed),
            other => Err(format!("unknown door state: {other}")),
        }
    }
}

/// One telemetry record, either still encrypted or already plaintext.
///
/// Fields are kept exactly as they appear on the wire, so [`decode`] and
/// [`encode`] are inverses for every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryRecord {
    /// Marker compared against the expected tag by the validator.
    pub tag: u16,
    /// Raw door state byte; see [`TelemetryRecord::door_state`].
    pub door_state: u8,
    /// Originating sensor.
    pub sensor_id: u8,
    /// Sensor supply voltage in millivolts.
    pub supply_voltage: u16,
    /// Unused padding.
    pub reserved: [u8; RESERVED_SIZE],
}

impl TelemetryRecord {
    /// Build a record with zeroed padding.
    pub fn new(tag: u16, door_state: DoorState, sensor_id: u8, supply_voltage: u16) -> Self {
        Self {
            tag,
            door_state: door_state.as_raw(),
            sensor_id,
            supply_voltage,
            reserved: [0u8; RESERVED_SIZE],
        }
    }

    /// Door state derived from the raw byte.
    pub fn door_state(&self) -> DoorState {
        DoorState::from_raw(self.door_state)
    }
}

/// Reinterpret a frame as a record. Never fails.
pub fn decode(frame: &RawFrame) -> TelemetryRecord {
    let mut src = &frame.as_bytes()[..];
    let tag = src.get_u16_le();
    let door_state = src.get_u8();
    let sensor_id = src.get_u8();
    let supply_voltage = src.get_u16_le();
    let mut reserved = [0u8; RESERVED_SIZE];
    src.copy_to_slice(&mut reserved);

    TelemetryRecord {
        tag,
        door_state,
        sensor_id,
        supply_voltage,
        reserved,
    }
}

/// Decode a borrowed buffer that must be exactly one record long.
pub fn decode_slice(bytes: &[u8]) -> Result<TelemetryRecord> {
    let frame = RawFrame::try_from(bytes).map_err(|_| FrameError::Size {
        actual: bytes.len(),
        expected: RECORD_SIZE,
    })?;
    Ok(decode(&frame))
}

/// Lay a record out as a frame.
pub fn encode(record: &TelemetryRecord) -> RawFrame {
    let mut block = [0u8; FRAME_SIZE];
    let mut dst = &mut block[..];
    dst.put_u16_le(record.tag);
    dst.put_u8(record.door_state);
    dst.put_u8(record.sensor_id);
    dst.put_u16_le(record.supply_voltage);
    dst.put_slice(&record.reserved);
    RawFrame::new(block)
}
