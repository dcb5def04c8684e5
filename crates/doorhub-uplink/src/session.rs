use std::time::{Duration, Instant};

use rumqttc::{
    Client, ConnectReturnCode, Connection, ConnectionError, Event, Outgoing, Packet, QoS,
    RecvTimeoutError,
};

use crate::config::{MqttConfig, Qos};
use crate::error::{Result, UplinkError};

/// Requests buffered between the client handle and its event loop. One
/// publish is in flight at a time.
const REQUEST_CAPACITY: usize = 10;

/// How long a liveness check waits for the event loop to report trouble.
const LIVENESS_WINDOW: Duration = Duration::from_millis(10);

/// Upper bound on events drained by one liveness check.
const LIVENESS_EVENTS: usize = 32;

/// A session with the remote telemetry endpoint.
pub trait Session {
    /// Whether the session is still usable. May touch the network to find
    /// out, and drops a session that turns out to be dead.
    fn is_connected(&mut self) -> bool;

    /// Establish the session. Replaces any previous one.
    fn connect(&mut self) -> Result<()>;

    /// Tear the session down, releasing any held resources. Never fails.
    fn disconnect(&mut self);

    /// Deliver one message. A single attempt, no retry.
    fn publish(&mut self, payload: &[u8]) -> Result<()>;
}

struct Link {
    client: Client,
    connection: Connection,
}

/// Publish-only MQTT session on a blocking `rumqttc` client.
///
/// The event loop only runs while this session drives it, so every
/// liveness check and publish pumps it. Any event-loop error drops the
/// client instead of letting it reconnect on its own, so reconnects stay
/// under the connectivity manager's retry budget.
pub struct MqttSession {
    config: MqttConfig,
    link: Option<Link>,
}

impl MqttSession {
    pub fn new(config: MqttConfig) -> Self {
        Self { config, link: None }
    }

    /// Session configuration.
    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    fn drop_link(&mut self, reason: &UplinkError) {
        if self.link.take().is_some() {
            tracing::debug!(endpoint = %self.config.endpoint(), error = %reason, "mqtt session dropped");
        }
    }
}

impl Session for MqttSession {
    fn is_connected(&mut self) -> bool {
        let Some(link) = self.link.as_mut() else {
            return false;
        };
        match pump(&mut link.connection) {
            Ok(()) => true,
            Err(err) => {
                self.drop_link(&err);
                false
            }
        }
    }

    fn connect(&mut self) -> Result<()> {
        self.disconnect();

        let (client, mut connection) = Client::new(self.config.mqtt_options(), REQUEST_CAPACITY);
        let deadline = Instant::now() + self.config.io_timeout;
        await_connack(&mut connection, deadline, &self.config.endpoint())?;

        tracing::debug!(endpoint = %self.config.endpoint(), "mqtt session established");
        self.link = Some(Link { client, connection });
        Ok(())
    }

    fn disconnect(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };
        if link.client.disconnect().is_err() {
            return;
        }

        let deadline = Instant::now() + self.config.io_timeout;
        while let Some(remaining) = remaining(deadline) {
            match link.connection.recv_timeout(remaining) {
                Ok(Ok(Event::Outgoing(Outgoing::Disconnect))) | Ok(Err(_)) | Err(_) => break,
                Ok(Ok(event)) => tracing::trace!(?event, "mqtt event while disconnecting"),
            }
        }
    }

    fn publish(&mut self, payload: &[u8]) -> Result<()> {
        let link = self.link.as_mut().ok_or(UplinkError::NotConnected)?;
        let deadline = Instant::now() + self.config.io_timeout;
        let result = pump(&mut link.connection).and_then(|()| {
            deliver(
                link,
                &self.config.topic,
                self.config.qos,
                payload,
                deadline,
            )
        });

        if let Err(err) = &result {
            self.drop_link(err);
        }
        result
    }
}

impl Drop for MqttSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for MqttSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSession")
            .field("endpoint", &self.config.endpoint())
            .field("connected", &self.link.is_some())
            .finish()
    }
}

fn remaining(deadline: Instant) -> Option<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    (!left.is_zero()).then_some(left)
}

/// Drive a fresh event loop until the broker accepts or refuses us.
fn await_connack(connection: &mut Connection, deadline: Instant, endpoint: &str) -> Result<()> {
    loop {
        let left = remaining(deadline).ok_or(UplinkError::Timeout("CONNACK"))?;
        match connection.recv_timeout(left) {
            Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(UplinkError::Refused(code)),
                };
            }
            Ok(Ok(event)) => tracing::trace!(?event, "mqtt event before CONNACK"),
            Ok(Err(ConnectionError::ConnectionRefused(code))) => {
                return Err(UplinkError::Refused(code))
            }
            Ok(Err(ConnectionError::Io(source))) => {
                return Err(UplinkError::Connect {
                    addr: endpoint.to_string(),
                    source,
                })
            }
            Ok(Err(err)) => return Err(err.into()),
            Err(RecvTimeoutError::Timeout) => return Err(UplinkError::Timeout("CONNACK")),
            Err(RecvTimeoutError::Disconnected) => return Err(UplinkError::NotConnected),
        }
    }
}

/// Let the event loop send due pings and surface a closed or stalled
/// connection. Returns once it has been idle for the liveness window.
fn pump(connection: &mut Connection) -> Result<()> {
    for _ in 0..LIVENESS_EVENTS {
        match connection.recv_timeout(LIVENESS_WINDOW) {
            Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                return Err(UplinkError::Protocol("broker sent DISCONNECT".to_string()))
            }
            Ok(Ok(event)) => tracing::trace!(?event, "mqtt event"),
            Ok(Err(err)) => return Err(err.into()),
            Err(RecvTimeoutError::Timeout) => return Ok(()),
            Err(RecvTimeoutError::Disconnected) => return Err(UplinkError::NotConnected),
        }
    }
    Ok(())
}

/// Queue one publish and drive the event loop until it is written (QoS 0)
/// or acknowledged (QoS 1).
fn deliver(
    link: &mut Link,
    topic: &str,
    qos: Qos,
    payload: &[u8],
    deadline: Instant,
) -> Result<()> {
    let waiting_for = match qos {
        Qos::AtMostOnce => "publish",
        Qos::AtLeastOnce => "PUBACK",
    };
    link.client
        .publish(topic, QoS::from(qos), false, payload.to_vec())?;

    let mut sent = None;
    loop {
        let left = remaining(deadline).ok_or(UplinkError::Timeout(waiting_for))?;
        match link.connection.recv_timeout(left) {
            Ok(Ok(Event::Outgoing(Outgoing::Publish(pkid)))) => {
                if qos == Qos::AtMostOnce {
                    return Ok(());
                }
                sent = Some(pkid);
            }
            Ok(Ok(Event::Incoming(Packet::PubAck(ack)))) if Some(ack.pkid) == sent => {
                return Ok(())
            }
            Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                return Err(UplinkError::Protocol("broker sent DISCONNECT".to_string()))
            }
            Ok(Ok(event)) => tracing::trace!(?event, "mqtt event while publishing"),
            Ok(Err(err)) => return Err(err.into()),
            Err(RecvTimeoutError::Timeout) => return Err(UplinkError::Timeout(waiting_for)),
            Err(RecvTimeoutError::Disconnected) => return Err(UplinkError::NotConnected),
        }
    }
}
