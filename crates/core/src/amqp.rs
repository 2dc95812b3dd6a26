//! Connection management for the message queue broker.
//!
//! The broker may come up slower than this process, so establishing the
//! connection retries with a squared back-off before giving up. The back-off
//! policy is pure and separated from the dialing I/O so it can be tested
//! without a live broker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lapin::{Connection, ConnectionProperties};

/// Queue connection shared by every publisher in the process. Callers only
/// read it to open short-lived channels; it is never mutated after startup.
pub type SharedConnection = Arc<Connection>;

/// Back-off schedule for connection attempts: the delay before attempt `n`
/// is `n²` seconds, so the first attempt is immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
}

impl RetryPolicy {
    /// One immediate attempt plus five retries. Raising or removing the cap
    /// is a deliberate design change, not a tuning knob: with no cap the
    /// squared delay grows without bound.
    pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

    pub const fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub const fn delay(attempt: usize) -> Duration {
        Duration::from_secs((attempt * attempt) as u64)
    }

    /// The full sequence of inter-attempt delays this policy will apply.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        (0..self.max_attempts).map(Self::delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

/// Where the connection manager is in its lifecycle. `Connected` and
/// `Failed` are terminal here; steady-state connection loss is handled by a
/// higher-level supervisor, not this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// The broker stayed unreachable through the whole retry schedule. The
/// process must not start serving traffic on the back of this error.
#[derive(Debug, thiserror::Error)]
#[error("message broker unreachable after {attempts} attempts: {reason}")]
pub struct ConnectError {
    pub attempts: usize,
    pub reason: String,
}

/// Establishes and hands out the process-wide queue connection.
#[derive(Debug)]
pub struct ConnectionManager {
    policy: RetryPolicy,
    state: ConnectionState,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Dial the broker at `target`, backing off between attempts per the
    /// retry policy. Returns the live connection or a fatal error once the
    /// attempt cap is exceeded.
    pub async fn connect(&mut self, target: &str) -> Result<SharedConnection, ConnectError> {
        let connection = self
            .establish(|| Connection::connect(target, ConnectionProperties::default()))
            .await?;
        tracing::info!(%target, "connected to message broker");
        Ok(Arc::new(connection))
    }

    /// Retry loop generic over the dialing future, so tests can drive it
    /// with stub dialers.
    async fn establish<T, E, F, Fut>(&mut self, mut dial: F) -> Result<T, ConnectError>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.state = ConnectionState::Connecting;
        let mut last_failure = String::new();
        for attempt in 0..self.policy.max_attempts() {
            let delay = RetryPolicy::delay(attempt);
            if !delay.is_zero() {
                tracing::info!(
                    attempt,
                    backoff_secs = delay.as_secs(),
                    "message broker not ready, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            match dial().await {
                Ok(connection) => {
                    self.state = ConnectionState::Connected;
                    return Ok(connection);
                }
                Err(err) => {
                    last_failure = err.to_string();
                    tracing::warn!(attempt, error = %last_failure, "broker dial failed");
                }
            }
        }
        self.state = ConnectionState::Failed;
        Err(ConnectError {
            attempts: self.policy.max_attempts(),
            reason: last_failure,
        })
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn backoff_schedule_is_squared_and_bounded() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = policy.delays().map(|d| d.as_secs()).collect();
        assert_eq!(delays, vec![0, 1, 4, 9, 16, 25]);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_attempt_cap() {
        let mut manager = ConnectionManager::new();
        let dials = Cell::new(0usize);
        let result: Result<(), _> = manager
            .establish(|| {
                dials.set(dials.get() + 1);
                async { Err::<(), _>("connection refused") }
            })
            .await;
        let err = result.unwrap_err();
        assert_eq!(err.attempts, 6);
        assert_eq!(dials.get(), 6);
        assert_eq!(manager.state(), ConnectionState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_the_broker_comes_up() {
        let mut manager = ConnectionManager::new();
        let dials = Cell::new(0usize);
        let started = tokio::time::Instant::now();
        let result = manager
            .establish(|| {
                dials.set(dials.get() + 1);
                let ready = dials.get() >= 3;
                async move {
                    if ready {
                        Ok(42u32)
                    } else {
                        Err("connection refused")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(dials.get(), 3);
        assert_eq!(manager.state(), ConnectionState::Connected);
        // Two failed attempts mean exactly the 0s and 1s and 4s delays ran.
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn never_retries_past_a_success() {
        let mut manager = ConnectionManager::new();
        let dials = Cell::new(0usize);
        let result = manager
            .establish(|| {
                dials.set(dials.get() + 1);
                async { Ok::<_, &str>(()) }
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(dials.get(), 1);
    }
}
