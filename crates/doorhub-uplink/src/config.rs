use std::fmt;
use std::time::Duration;

use rumqttc::{MqttOptions, QoS};

/// Plain-text MQTT port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// MQTT delivery guarantee used for door state messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qos {
    /// Fire and forget. A publish succeeds once it is written to a live
    /// session.
    #[default]
    AtMostOnce,
    /// Wait for the broker's PUBACK.
    AtLeastOnce,
}

impl From<Qos> for QoS {
    fn from(qos: Qos) -> Self {
        match qos {
            Qos::AtMostOnce => QoS::AtMostOnce,
            Qos::AtLeastOnce => QoS::AtLeastOnce,
        }
    }
}

impl TryFrom<u8> for Qos {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Qos::AtMostOnce),
            1 => Ok(Qos::AtLeastOnce),
            other => Err(format!("unsupported QoS level {other} (expected 0 or 1)")),
        }
    }
}

/// Bounded retry for establishing the remote session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failed connects before the link halts. At least one
    /// attempt is always made.
    pub max_attempts: u32,
    /// Blocking pause after every failed attempt.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Connection settings for an MQTT broker.
#[derive(Clone)]
pub struct MqttConfig {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client identifier sent in CONNECT.
    pub client_id: String,
    /// Optional user name.
    pub username: Option<String>,
    /// Optional password or API key. Never logged.
    pub password: Option<String>,
    /// Topic door states are published to.
    pub topic: String,
    /// Delivery guarantee.
    pub qos: Qos,
    /// Keep-alive advertised to the broker.
    pub keep_alive: Duration,
    /// Timeout for connect, read and write operations.
    pub io_timeout: Duration,
}

impl MqttConfig {
    /// Adafruit IO style feed topic: `<username>/feeds/<feed>`.
    pub fn feed_topic(username: &str, feed: &str) -> String {
        format!("{username}/feeds/{feed}")
    }

    /// `host:port` label for diagnostics.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Client options for a clean, credentialed session.
    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options
            .set_keep_alive(keep_alive_secs(self.keep_alive))
            .set_clean_session(true);
        if let Some(username) = &self.username {
            options.set_credentials(username, self.password.as_deref().unwrap_or_default());
        }
        options
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "io.adafruit.com".to_string(),
            port: DEFAULT_MQTT_PORT,
            client_id: "doorhub".to_string(),
            username: None,
            password: None,
            topic: "doorhub/door".to_string(),
            qos: Qos::AtMostOnce,
            keep_alive: Duration::from_secs(300),
            io_timeout: Duration::from_secs(5),
        }
    }
}

/// Shortest keep-alive the client accepts.
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Whole seconds, no shorter than the client minimum. Zero disables keep-alive.
fn keep_alive_secs(keep_alive: Duration) -> Duration {
    if keep_alive.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_secs(keep_alive.as_secs()).max(MIN_KEEP_ALIVE)
}

impl fmt::Debug for MqttConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("MqttConfig");
        dbg.field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field("username", &self.username);
        if let Some(password) = &self.password {
            dbg.field(
                "password",
                &format_args!("<redacted:{} bytes>", password.len()),
            );
        } else {
            dbg.field("password", &Option::<String>::None);
        }
        dbg.field("topic", &self.topic)
            .field("qos", &self.qos)
            .field("keep_alive", &self.keep_alive)
            .field("io_timeout", &self.io_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let config = MqttConfig {
            password: Some("aio_secret_key".to_string()),
            ..MqttConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted:14 bytes>"));
        assert!(!rendered.contains("aio_secret_key"));
    }

    #[test]
    fn feed_topic_layout() {
        assert_eq!(MqttConfig::feed_topic("alice", "door"), "alice/feeds/door");
    }

    #[test]
    fn qos_from_level() {
        assert_eq!(Qos::try_from(0).unwrap(), Qos::AtMostOnce);
        assert_eq!(Qos::try_from(1).unwrap(), Qos::AtLeastOnce);
        assert!(Qos::try_from(2).is_err());
    }

    #[test]
    fn options_carry_session_settings() {
        let config = MqttConfig {
            username: Some("alice".to_string()),
            password: Some("key".to_string()),
            keep_alive: Duration::from_millis(1500),
            ..MqttConfig::default()
        };
        let options = config.mqtt_options();

        assert_eq!(
            options.broker_address(),
            ("io.adafruit.com".to_string(), DEFAULT_MQTT_PORT)
        );
        assert_eq!(options.client_id(), "doorhub");
        assert_eq!(options.keep_alive(), MIN_KEEP_ALIVE);
        assert!(options.clean_session());
    }

    #[test]
    fn short_keep_alive_is_raised() {
        assert_eq!(keep_alive_secs(Duration::ZERO), Duration::ZERO);
        assert_eq!(keep_alive_secs(Duration::from_millis(10)), MIN_KEEP_ALIVE);
        assert_eq!(keep_alive_secs(Duration::from_secs(300)), Duration::from_secs(300));
    }

    #[test]
    fn qos_maps_to_wire_level() {
        assert_eq!(QoS::from(Qos::AtMostOnce), QoS::AtMostOnce);
        assert_eq!(QoS::from(Qos::AtLeastOnce), QoS::AtLeastOnce);
    }

    #[test]
    fn default_retry_policy_matches_firmware() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.retry_delay, Duration::from_secs(5));
    }
}
