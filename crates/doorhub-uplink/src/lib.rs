//! Remote telemetry uplink for the door sensor hub.
//!
//! Two layers:
//! - [`session`]: a [`Session`] talks to the remote endpoint. [`MqttSession`]
//!   publishes over MQTT with a blocking `rumqttc` client.
//! - [`connectivity`]: the [`ConnectivityManager`] guarantees the session is
//!   up before anything is published, retries a bounded number of times, and
//!   otherwise parks in the terminal [`LinkState::Halted`] state.
//!
//! `Halted` is never left in software. The surrounding process is expected to
//! treat it as a request for an external restart.

pub mod config;
pub mod connectivity;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod session;

pub use config::{MqttConfig, Qos, RetryPolicy, DEFAULT_MQTT_PORT};
pub use connectivity::{BlockingDelay, ConnectivityManager, Delay, LinkState, Uplink};
pub use error::{Result, UplinkError};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{NoDelay, RecordingDelay, ScriptedSession};
pub use rumqttc::ConnectReturnCode;
pub use session::{MqttSession, Session};
