use std::time::Duration;

use crate::config::RetryPolicy;
use crate::session::Session;

/// Connectivity state of the uplink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    /// Retry budget exhausted. Terminal until the process is restarted.
    Halted,
}

impl LinkState {
    pub fn is_halted(self) -> bool {
        matches!(self, LinkState::Halted)
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Halted => "halted",
        };
        f.write_str(label)
    }
}

/// Pause between connect attempts.
pub trait Delay {
    fn wait(&mut self, duration: Duration);
}

/// Blocks the calling thread for the whole delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingDelay;

impl Delay for BlockingDelay {
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// The remote publish path as seen by the dispatcher.
pub trait Uplink {
    /// Make sure the remote endpoint is reachable. Blocks through retries.
    fn ensure_connected(&mut self) -> LinkState;

    /// One publish attempt. `false` on any failure.
    fn publish(&mut self, label: &str) -> bool;

    /// Current state without side effects.
    fn state(&self) -> LinkState;
}

/// Owns the remote session and enforces the bounded-retry contract.
///
/// `Disconnected -> Connecting -> Connected`; each failed attempt drops back
/// to `Disconnected` and waits `retry_delay`. After `max_attempts`
/// consecutive failures the manager is `Halted` for good.
pub struct ConnectivityManager<S, D = BlockingDelay> {
    session: S,
    delay: D,
    policy: RetryPolicy,
    state: LinkState,
    failed_attempts: u64,
}

impl<S: Session> ConnectivityManager<S, BlockingDelay> {
    /// Create a manager that sleeps between attempts.
    pub fn new(session: S, policy: RetryPolicy) -> Self {
        Self::with_delay(session, policy, BlockingDelay)
    }
}

impl<S: Session, D: Delay> ConnectivityManager<S, D> {
    /// Create a manager with an explicit delay strategy.
    pub fn with_delay(session: S, policy: RetryPolicy, delay: D) -> Self {
        Self {
            session,
            delay,
            policy,
            state: LinkState::Disconnected,
            failed_attempts: 0,
        }
    }

    /// Borrow the session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Borrow the delay strategy.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Retry policy in force.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Failed connect attempts over the manager's lifetime.
    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts
    }

    /// Consume the manager and return the session.
    pub fn into_session(self) -> S {
        self.session
    }
}

impl<S: Session, D: Delay> Uplink for ConnectivityManager<S, D> {
    fn ensure_connected(&mut self) -> LinkState {
        let state = self.state;
        match state {
            LinkState::Halted => return LinkState::Halted,
            LinkState::Connected if self.session.is_connected() => return LinkState::Connected,
            LinkState::Connected => tracing::info!("uplink session lost; reconnecting"),
            _ => {}
        }

        let budget = self.policy.max_attempts.max(1);
        let mut remaining = budget;
        self.state = LinkState::Connecting;
        tracing::info!("connecting uplink");

        loop {
            match self.session.connect() {
                Ok(()) => {
                    self.state = LinkState::Connected;
                    tracing::info!("uplink connected");
                    return LinkState::Connected;
                }
                Err(err) => {
                    remaining -= 1;
                    self.failed_attempts += 1;
                    self.session.disconnect();
                    self.state = LinkState::Disconnected;
                    tracing::warn!(
                        error = %err,
                        remaining,
                        retry_delay = ?self.policy.retry_delay,
                        "uplink connect failed"
                    );
                    self.delay.wait(self.policy.retry_delay);

                    if remaining == 0 {
                        self.state = LinkState::Halted;
                        tracing::error!(
                            attempts = budget,
                            "uplink retries exhausted; halting until external reset"
                        );
                        return LinkState::Halted;
                    }
                    self.state = LinkState::Connecting;
                }
            }
        }
    }

    fn publish(&mut self, label: &str) -> bool {
        if self.state != LinkState::Connected {
            tracing::warn!(state = %self.state, "publish skipped; uplink not connected");
            return false;
        }

        match self.session.publish(label.as_bytes()) {
            Ok(()) => {
                tracing::debug!(label, "published");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, label, "publish failed");
                if !self.session.is_connected() {
                    self.state = LinkState::Disconnected;
                }
                false
            }
        }
    }

    fn state(&self) -> LinkState {
        self.state
    }
}

impl<S, D> std::fmt::Debug for ConnectivityManager<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityManager")
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("failed_attempts", &self.failed_attempts)
            .finish()
    }
}
