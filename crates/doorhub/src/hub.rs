use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use doorhub_radio::{RadioError, RadioTransport, RawFrame};
use doorhub_uplink::Uplink;

use crate::dispatch::{Coordinator, Dispatch};
use crate::error::HubError;
use crate::sink::{Clock, DisplaySink, EventLog};

/// Receive loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    /// Sleep between polls when no frame is waiting.
    pub poll_interval: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// Why the receive loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubExit {
    /// The stop flag was raised.
    Stopped,
    /// The radio source ended.
    SourceClosed,
    /// The uplink exhausted its retry budget. Needs an external restart.
    Halted,
}

/// Counters over the loop's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub frames: u64,
    pub delivered: u64,
    pub rejected: u64,
    pub published: u64,
    pub log_failures: u64,
    /// Malformed frames discarded by the radio layer.
    pub dropped: u64,
}

/// Single-threaded poll loop: one frame runs to completion before the
/// radio is polled again.
pub struct Hub<T, D, U, L, C> {
    radio: T,
    coordinator: Coordinator<D, U, L, C>,
    config: HubConfig,
    stats: HubStats,
}

impl<T, D, U, L, C> Hub<T, D, U, L, C>
where
    T: RadioTransport,
    D: DisplaySink,
    U: Uplink,
    L: EventLog,
    C: Clock,
{
    pub fn new(radio: T, coordinator: Coordinator<D, U, L, C>, config: HubConfig) -> Self {
        Self {
            radio,
            coordinator,
            config,
            stats: HubStats::default(),
        }
    }

    /// Poll until stopped, the source closes, or the uplink halts.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<HubExit, HubError> {
        tracing::info!(poll_interval = ?self.config.poll_interval, "hub started");

        let exit = loop {
            if stop.load(Ordering::SeqCst) {
                break HubExit::Stopped;
            }
            if self.coordinator.uplink().state().is_halted() {
                break HubExit::Halted;
            }

            let received = match self.radio.frame_available() {
                Ok(true) => self.radio.receive(),
                Ok(false) => {
                    std::thread::sleep(self.config.poll_interval);
                    continue;
                }
                Err(err) => Err(err),
            };

            match received {
                Ok(frame) => {
                    if self.process(&frame).is_halted() {
                        break HubExit::Halted;
                    }
                }
                Err(RadioError::Closed) => break HubExit::SourceClosed,
                Err(err) if err.is_recoverable() => {
                    self.stats.dropped += 1;
                    tracing::warn!(error = %err, "dropping malformed frame");
                }
                Err(err) => return Err(err.into()),
            }
        };

        tracing::info!(?exit, stats = ?self.stats, "hub stopped");
        Ok(exit)
    }

    /// Dispatch one frame and update the counters.
    pub fn process(&mut self, frame: &RawFrame) -> Dispatch {
        let result = self.coordinator.handle(frame);
        self.stats.frames += 1;
        match &result {
            Dispatch::Rejected => self.stats.rejected += 1,
            Dispatch::Delivered { outcome, logged } => {
                self.stats.delivered += 1;
                if outcome.published {
                    self.stats.published += 1;
                }
                if !logged {
                    self.stats.log_failures += 1;
                }
            }
            Dispatch::Halted => {}
        }
        result
    }

    pub fn stats(&self) -> HubStats {
        self.stats
    }

    pub fn coordinator(&self) -> &Coordinator<D, U, L, C> {
        &self.coordinator
    }

    pub fn radio(&self) -> &T {
        &self.radio
    }

    pub fn into_parts(self) -> (T, Coordinator<D, U, L, C>) {
        (self.radio, self.coordinator)
    }
}

impl<T, D, U, L, C> std::fmt::Debug for Hub<T, D, U, L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::display::TextDisplay;
    use crate::event_log::MemoryEventLog;
    use doorhub_frame::{encode, seal, DoorState, PresharedKey, TelemetryRecord};
    use doorhub_radio::{MockRadio, StreamRadio};
    use doorhub_uplink::{ConnectivityManager, NoDelay, RetryPolicy, ScriptedSession};
    use doorhub_validate::{Validator, DEFAULT_EXPECTED_TAG};

    fn key() -> PresharedKey {
        PresharedKey::new(b"hub-psk").unwrap()
    }

    fn frame(tag: u16) -> RawFrame {
        seal(&encode(&TelemetryRecord::new(tag, DoorState::Open, 9, 3000)), &key())
    }

    fn hub<T: RadioTransport>(
        radio: T,
        session: ScriptedSession,
    ) -> Hub<
        T,
        TextDisplay<Vec<u8>>,
        ConnectivityManager<ScriptedSession, NoDelay>,
        MemoryEventLog,
        FixedClock,
    > {
        let coordinator = Coordinator::new(
            key(),
            Validator::new(),
            TextDisplay::new(Vec::new()),
            ConnectivityManager::with_delay(session, RetryPolicy::default(), NoDelay),
            MemoryEventLog::new(),
            FixedClock::new("t"),
        );
        Hub::new(radio, coordinator, HubConfig::default())
    }

    #[test]
    fn drains_source_then_reports_closed() {
        let radio = MockRadio::from_frames([
            frame(DEFAULT_EXPECTED_TAG),
            frame(7),
            frame(DEFAULT_EXPECTED_TAG),
        ]);
        let mut hub = hub(radio, ScriptedSession::reachable());

        let exit = hub.run(&AtomicBool::new(false)).unwrap();
        assert_eq!(exit, HubExit::SourceClosed);
        assert_eq!(
            hub.stats(),
            HubStats {
                frames: 3,
                delivered: 2,
                rejected: 1,
                published: 2,
                log_failures: 0,
                dropped: 0,
            }
        );
        assert_eq!(hub.coordinator().event_log().entries().len(), 2);
    }

    #[test]
    fn stop_flag_wins() {
        let radio = MockRadio::from_frames([frame(DEFAULT_EXPECTED_TAG)]);
        let mut hub = hub(radio, ScriptedSession::reachable());

        let exit = hub.run(&AtomicBool::new(true)).unwrap();
        assert_eq!(exit, HubExit::Stopped);
        assert_eq!(hub.stats().frames, 0);
    }

    #[test]
    fn halt_ends_the_loop() {
        let radio = MockRadio::from_frames([
            frame(DEFAULT_EXPECTED_TAG),
            frame(DEFAULT_EXPECTED_TAG),
        ]);
        let mut hub = hub(radio, ScriptedSession::unreachable());

        assert_eq!(hub.run(&AtomicBool::new(false)).unwrap(), HubExit::Halted);
        assert_eq!(hub.radio().remaining(), 1);
        assert_eq!(hub.coordinator().uplink().session().publish_attempts(), 0);
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut bytes = frame(DEFAULT_EXPECTED_TAG).into_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 5]);
        let radio = StreamRadio::new(std::io::Cursor::new(bytes));
        let mut hub = hub(radio, ScriptedSession::reachable());

        let err = hub.run(&AtomicBool::new(false)).unwrap_err();
        assert!(matches!(err, HubError::Radio(RadioError::Truncated { .. })));
        assert_eq!(hub.stats().delivered, 1);
    }

    #[cfg(unix)]
    #[test]
    fn idle_pipe_still_honours_stop() {
        use std::os::unix::net::UnixStream;
        use std::sync::Arc;
        use std::thread;

        use doorhub_radio::ThreadedRadio;

        let (reader, _writer) = UnixStream::pair().unwrap();
        let radio = ThreadedRadio::spawn(reader).unwrap();
        let mut hub = hub(radio, ScriptedSession::reachable());

        let stop = Arc::new(AtomicBool::new(false));
        let raise = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                stop.store(true, Ordering::SeqCst);
            })
        };

        assert_eq!(hub.run(&stop).unwrap(), HubExit::Stopped);
        assert_eq!(hub.stats().frames, 0);
        raise.join().unwrap();
    }
}
