use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::thread;

use crate::error::{RadioError, Result};
use crate::stream::StreamRadio;
use crate::traits::{RadioTransport, RawFrame};

/// Frames read ahead of the consumer before the reader thread waits.
const READ_AHEAD: usize = 16;

/// Stream frame source whose blocking reads happen on a dedicated thread.
///
/// `frame_available` only looks at what the reader thread has already
/// delivered, so a poll loop keeps checking its stop flag while the stream
/// is idle. The thread ends after the first unrecoverable error, or on its
/// next frame once this source is dropped.
pub struct ThreadedRadio {
    frames: Receiver<Result<RawFrame>>,
    pending: Option<RawFrame>,
}

impl ThreadedRadio {
    /// Read frames from `reader` on a new thread.
    pub fn spawn<R>(reader: R) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        Self::spawn_with(move || Ok(reader))
    }

    /// Read frames from a file, FIFO or character device on a new thread.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // Opening a FIFO blocks until a writer shows up, so only stat it here.
        std::fs::metadata(&path).map_err(|source| RadioError::Open {
            path: path.clone(),
            source,
        })?;

        Self::spawn_with(move || {
            let file = File::open(&path).map_err(|source| RadioError::Open {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "opened threaded radio source");
            Ok(file)
        })
    }

    fn spawn_with<R, F>(open: F) -> Result<Self>
    where
        R: Read,
        F: FnOnce() -> Result<R> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(READ_AHEAD);
        thread::Builder::new()
            .name("doorhub-radio-reader".to_string())
            .spawn(move || read_frames(open, tx))?;
        Ok(Self {
            frames: rx,
            pending: None,
        })
    }
}

fn read_frames<R, F>(open: F, tx: SyncSender<Result<RawFrame>>)
where
    R: Read,
    F: FnOnce() -> Result<R>,
{
    let mut radio = match open() {
        Ok(reader) => StreamRadio::new(reader),
        Err(err) => {
            let _ = tx.send(Err(err));
            return;
        }
    };

    loop {
        let received = radio.receive();
        let finished = matches!(&received, Err(err) if !err.is_recoverable());
        if tx.send(received).is_err() || finished {
            break;
        }
    }
    tracing::debug!("radio reader finished");
}

impl RadioTransport for ThreadedRadio {
    fn frame_available(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        match self.frames.try_recv() {
            Ok(Ok(frame)) => {
                self.pending = Some(frame);
                Ok(true)
            }
            Ok(Err(err)) => Err(err),
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(RadioError::Closed),
        }
    }

    fn receive(&mut self) -> Result<RawFrame> {
        if let Some(frame) = self.pending.take() {
            return Ok(frame);
        }
        self.frames.recv().unwrap_or(Err(RadioError::Closed))
    }
}

impl std::fmt::Debug for ThreadedRadio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadedRadio")
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::traits::FRAME_SIZE;

    fn frames(count: u8) -> Vec<u8> {
        (0..count)
            .flat_map(|i| std::iter::repeat(i).take(FRAME_SIZE))
            .collect()
    }

    /// Poll until a frame shows up or the source fails.
    fn poll(radio: &mut ThreadedRadio) -> Result<bool> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match radio.frame_available() {
                Ok(false) if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5))
                }
                other => return other,
            }
        }
    }

    #[test]
    fn frames_cross_the_thread_in_order() {
        let mut radio = ThreadedRadio::spawn(Cursor::new(frames(3))).unwrap();

        for expected in 0..3u8 {
            assert!(poll(&mut radio).unwrap());
            assert_eq!(radio.receive().unwrap().as_bytes(), &[expected; FRAME_SIZE]);
        }
        assert!(matches!(poll(&mut radio), Err(RadioError::Closed)));
        assert!(matches!(radio.receive(), Err(RadioError::Closed)));
    }

    #[test]
    fn truncated_tail_is_forwarded() {
        let mut bytes = frames(1);
        bytes.extend_from_slice(&[4u8; 3]);
        let mut radio = ThreadedRadio::spawn(Cursor::new(bytes)).unwrap();

        radio.receive().unwrap();
        assert!(matches!(
            radio.receive(),
            Err(RadioError::Truncated { pending: 3, .. })
        ));
        assert!(matches!(radio.receive(), Err(RadioError::Closed)));
    }

    #[test]
    fn open_missing_path_fails() {
        let err = ThreadedRadio::open("/nonexistent/doorhub/radio").unwrap_err();
        assert!(matches!(err, RadioError::Open { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn idle_stream_never_blocks_the_poll() {
        use std::io::Write;
        use std::os::unix::net::UnixStream;

        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut radio = ThreadedRadio::spawn(reader).unwrap();

        let started = Instant::now();
        assert!(!radio.frame_available().unwrap());
        assert!(started.elapsed() < Duration::from_secs(1));

        writer.write_all(&frames(1)).unwrap();
        assert!(poll(&mut radio).unwrap());
        assert_eq!(radio.receive().unwrap().as_bytes(), &[0u8; FRAME_SIZE]);

        drop(writer);
        assert!(matches!(poll(&mut radio), Err(RadioError::Closed)));
    }
}
