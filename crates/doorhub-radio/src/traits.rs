use crate::error::{RadioError, Result};

/// Size of every radio frame on the air, in bytes.
pub const FRAME_SIZE: usize = 32;

/// One fixed-size block exactly as received from the radio.
///
/// The contents are opaque at this layer; they are usually ciphertext.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_SIZE]);

impl RawFrame {
    /// Wrap an owned block.
    pub const fn new(bytes: [u8; FRAME_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the frame bytes.
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    /// Mutably borrow the frame bytes.
    pub fn as_mut_bytes(&mut self) -> &mut [u8; FRAME_SIZE] {
        &mut self.0
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> [u8; FRAME_SIZE] {
        self.0
    }

    /// Length of the frame, always [`FRAME_SIZE`].
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        FRAME_SIZE
    }
}

impl From<[u8; FRAME_SIZE]> for RawFrame {
    fn from(bytes: [u8; FRAME_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for RawFrame {
    type Error = RadioError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let block: [u8; FRAME_SIZE] = bytes.try_into().map_err(|_| RadioError::FrameSize {
            actual: bytes.len(),
            expected: FRAME_SIZE,
        })?;
        Ok(Self(block))
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawFrame(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// A source of radio frames.
///
/// Mirrors the receive side of a packet radio driver: poll for availability,
/// then read exactly one frame.
pub trait RadioTransport {
    /// Whether a complete frame can be received without waiting.
    fn frame_available(&mut self) -> Result<bool>;

    /// Receive exactly one frame, blocking until it is complete.
    fn receive(&mut self) -> Result<RawFrame>;
}

impl<T: RadioTransport + ?Sized> RadioTransport for Box<T> {
    fn frame_available(&mut self) -> Result<bool> {
        (**self).frame_available()
    }

    fn receive(&mut self) -> Result<RawFrame> {
        (**self).receive()
    }
}
