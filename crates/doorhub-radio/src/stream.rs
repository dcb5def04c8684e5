use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::BytesMut;

use crate::error::{RadioError, Result};
use crate::traits::{RadioTransport, RawFrame, FRAME_SIZE};

const INITIAL_BUFFER_CAPACITY: usize = 4 * FRAME_SIZE;
const READ_CHUNK_SIZE: usize = 1024;

/// Reads back-to-back fixed-size frames from any `Read` stream.
///
/// Partial reads are buffered; callers only ever see complete frames.
/// A stream that reports `WouldBlock` or `TimedOut` simply has no frame yet.
pub struct StreamRadio<R> {
    inner: R,
    buf: BytesMut,
    eof: bool,
}

impl<R: Read> StreamRadio<R> {
    /// Create a frame source over a byte stream.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            eof: false,
        }
    }

    /// Number of buffered bytes not yet returned as a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the source and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Perform one read. Returns `Ok(false)` if the stream would block.
    fn fill(&mut self) -> Result<bool> {
        if self.eof {
            return Err(self.end_of_stream());
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    if self.buf.len() >= FRAME_SIZE {
                        return Ok(true);
                    }
                    return Err(self.end_of_stream());
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(false);
                }
                Err(err) => return Err(RadioError::Io(err)),
            }
        }
    }

    fn end_of_stream(&self) -> RadioError {
        if self.buf.is_empty() {
            RadioError::Closed
        } else {
            RadioError::Truncated {
                pending: self.buf.len(),
                expected: FRAME_SIZE,
            }
        }
    }
}

impl StreamRadio<File> {
    /// Open a file, FIFO or character device as a frame source.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RadioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened stream radio source");
        Ok(Self::new(file))
    }
}

impl<R: Read> RadioTransport for StreamRadio<R> {
    fn frame_available(&mut self) -> Result<bool> {
        if self.buf.len() >= FRAME_SIZE {
            return Ok(true);
        }
        self.fill()?;
        Ok(self.buf.len() >= FRAME_SIZE)
    }

    fn receive(&mut self) -> Result<RawFrame> {
        while self.buf.len() < FRAME_SIZE {
            if !self.fill()? {
                std::thread::yield_now();
            }
        }
        let block = self.buf.split_to(FRAME_SIZE);
        RawFrame::try_from(block.as_ref())
    }
}

impl<R> std::fmt::Debug for StreamRadio<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRadio")
            .field("pending", &self.buf.len())
            .field("eof", &self.eof)
            .finish()
    }
}
