/// Errors that can occur while preparing keys or decoding records.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A borrowed buffer is not exactly one record long.
    #[error("record size mismatch ({actual} bytes, expected {expected})")]
    Size { actual: usize, expected: usize },

    /// The pre-shared key has no bytes.
    #[error("pre-shared key must not be empty")]
    EmptyKey,
}

pub type Result<T> = std::result::Result<T, FrameError>;
