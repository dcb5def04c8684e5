//! Radio frame sources for the door sensor hub.
//!
//! Every sensor transmission arrives as one fixed-size [`RawFrame`]. This
//! crate hides where those frames come from:
//! - [`StreamRadio`] reads back-to-back frames from any byte stream (serial
//!   bridge, FIFO, file, stdin)
//! - [`UdpRadio`] takes one frame per datagram from a radio gateway
//! - [`ThreadedRadio`] moves a blocking stream read onto its own thread so
//!   `frame_available` never blocks
//! - `MockRadio` replays an in-memory queue in tests (`test-util` feature)
//!
//! This is the lowest layer of doorhub. Everything else builds on top of the
//! [`RadioTransport`] trait provided here.

pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod stream;
pub mod threaded;
pub mod traits;
pub mod udp;

pub use error::{RadioError, Result};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockRadio;
pub use stream::StreamRadio;
pub use threaded::ThreadedRadio;
pub use traits::{RadioTransport, RawFrame, FRAME_SIZE};
pub use udp::UdpRadio;
