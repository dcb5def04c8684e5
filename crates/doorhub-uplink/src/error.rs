use rumqttc::{ClientError, ConnectReturnCode, ConnectionError};

/// Errors that can occur talking to the remote endpoint.
#[derive(Debug, thiserror::Error)]
pub enum UplinkError {
    /// The broker could not be reached.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// The broker answered CONNECT with a non-zero return code.
    #[error("broker refused connection: {0:?}")]
    Refused(ConnectReturnCode),

    /// The MQTT event loop failed after the session was established.
    #[error("mqtt connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The request could not be queued for the event loop.
    #[error("mqtt client error: {0}")]
    Client(#[from] ClientError),

    /// The remote rejected the message.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Publish attempted without an established session.
    #[error("session not connected")]
    NotConnected,

    /// The remote did not answer in time.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

pub type Result<T> = std::result::Result<T, UplinkError>;
