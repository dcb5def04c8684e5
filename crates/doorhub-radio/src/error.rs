use std::path::PathBuf;

/// Errors that can occur while receiving radio frames.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Failed to open a file or device used as a frame source.
    #[error("failed to open radio source {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to bind the gateway socket.
    #[error("failed to bind radio socket {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// A frame of the wrong size was delivered.
    #[error("frame size mismatch ({actual} bytes, expected {expected})")]
    FrameSize { actual: usize, expected: usize },

    /// The source ended part way through a frame.
    #[error("radio source closed mid-frame ({pending} of {expected} bytes)")]
    Truncated { pending: usize, expected: usize },

    /// The source has no more frames.
    #[error("radio source closed")]
    Closed,

    /// An I/O error occurred on the underlying source.
    #[error("radio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RadioError {
    /// Whether the source can keep delivering frames after this error.
    ///
    /// A single oversized or undersized datagram does not poison the source.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RadioError::FrameSize { .. })
    }
}

pub type Result<T> = std::result::Result<T, RadioError>;
