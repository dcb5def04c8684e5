use std::path::PathBuf;

use doorhub_radio::RadioError;

/// Errors from the persistent event log.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// The log file could not be opened for appending.
    #[error("could not open event log {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The entry could not be written.
    #[error("could not write event log {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The log medium is not available.
    #[error("event log unavailable")]
    Unavailable,
}

/// Clock construction errors.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("invalid time format {0:?}")]
    InvalidFormat(String),
}

/// Errors that stop the receive loop.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The radio source failed in a way that cannot be skipped.
    #[error("radio error: {0}")]
    Radio(#[from] RadioError),
}
