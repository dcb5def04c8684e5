//! Scripted session and delay doubles for tests.

use std::collections::VecDeque;
use std::time::Duration;

use rumqttc::ConnectReturnCode;

use crate::connectivity::Delay;
use crate::error::{Result, UplinkError};
use crate::session::Session;

/// A session whose connect and publish outcomes follow a script.
///
/// Scripted outcomes are consumed first; once a script runs out, the
/// default outcome applies.
#[derive(Debug, Clone)]
pub struct ScriptedSession {
    connect_script: VecDeque<bool>,
    publish_script: VecDeque<bool>,
    connect_default: bool,
    publish_default: bool,
    connected: bool,
    connect_attempts: usize,
    publish_attempts: usize,
    disconnects: usize,
    published: Vec<String>,
}

impl ScriptedSession {
    /// Every connect and publish succeeds.
    pub fn reachable() -> Self {
        Self::with_defaults(true, true)
    }

    /// Every connect fails.
    pub fn unreachable() -> Self {
        Self::with_defaults(false, true)
    }

    fn with_defaults(connect_default: bool, publish_default: bool) -> Self {
        Self {
            connect_script: VecDeque::new(),
            publish_script: VecDeque::new(),
            connect_default,
            publish_default,
            connected: false,
            connect_attempts: 0,
            publish_attempts: 0,
            disconnects: 0,
            published: Vec::new(),
        }
    }

    /// Outcomes for the next connect attempts.
    pub fn with_connect_script(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.connect_script.extend(outcomes);
        self
    }

    /// Outcomes for the next publish attempts.
    pub fn with_publish_script(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.publish_script.extend(outcomes);
        self
    }

    /// Outcome for publishes once the script is exhausted.
    pub fn with_publish_default(mut self, accept: bool) -> Self {
        self.publish_default = accept;
        self
    }

    /// Simulate the remote closing the session.
    pub fn drop_connection(&mut self) {
        self.connected = false;
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts
    }

    pub fn publish_attempts(&self) -> usize {
        self.publish_attempts
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects
    }

    /// Payloads the remote accepted, in order.
    pub fn published(&self) -> &[String] {
        &self.published
    }
}

impl Session for ScriptedSession {
    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn connect(&mut self) -> Result<()> {
        self.connect_attempts += 1;
        let accept = self
            .connect_script
            .pop_front()
            .unwrap_or(self.connect_default);
        if accept {
            self.connected = true;
            Ok(())
        } else {
            self.connected = false;
            Err(UplinkError::Refused(ConnectReturnCode::ServiceUnavailable))
        }
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    fn publish(&mut self, payload: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(UplinkError::NotConnected);
        }
        self.publish_attempts += 1;
        let accept = self
            .publish_script
            .pop_front()
            .unwrap_or(self.publish_default);
        if accept {
            self.published
                .push(String::from_utf8_lossy(payload).into_owned());
            Ok(())
        } else {
            Err(UplinkError::Protocol("publish rejected by remote".to_string()))
        }
    }
}

/// Records requested delays without sleeping.
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    waits: Vec<Duration>,
}

impl RecordingDelay {
    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }
}

impl Delay for RecordingDelay {
    fn wait(&mut self, duration: Duration) {
        self.waits.push(duration);
    }
}

/// Skips every delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&mut self, _duration: Duration) {}
}
