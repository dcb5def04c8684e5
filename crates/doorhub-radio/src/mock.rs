//! In-memory frame source for tests.

use std::collections::VecDeque;

use crate::error::{RadioError, Result};
use crate::traits::{RadioTransport, RawFrame};

/// Replays queued frames in order, then reports [`RadioError::Closed`].
#[derive(Debug, Default, Clone)]
pub struct MockRadio {
    queue: VecDeque<RawFrame>,
    received: usize,
}

impl MockRadio {
    /// Create an empty mock radio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock radio preloaded with frames.
    pub fn from_frames(frames: impl IntoIterator<Item = RawFrame>) -> Self {
        Self {
            queue: frames.into_iter().collect(),
            received: 0,
        }
    }

    /// Queue a frame for delivery.
    pub fn push(&mut self, frame: RawFrame) {
        self.queue.push_back(frame);
    }

    /// Frames still waiting to be received.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Frames handed out so far.
    pub fn received(&self) -> usize {
        self.received
    }
}

impl RadioTransport for MockRadio {
    fn frame_available(&mut self) -> Result<bool> {
        if self.queue.is_empty() {
            return Err(RadioError::Closed);
        }
        Ok(true)
    }

    fn receive(&mut self) -> Result<RawFrame> {
        let frame = self.queue.pop_front().ok_or(RadioError::Closed)?;
        self.received += 1;
        Ok(frame)
    }
}
