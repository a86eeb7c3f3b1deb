//! Wait cadences for the loading placeholder loop and long-running job polls.

use std::time::{Duration, Instant};

/// Resend cadence for responses carrying `status: "loading"`.
///
/// The loop resends the identical request every `interval` until the status
/// changes or `deadline` has elapsed since the first send; after that the last
/// loading body is handed back to the caller as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingRetry {
    pub interval: Duration,
    pub deadline: Duration,
}

impl LoadingRetry {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub const fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }

    /// Default cadence with the deadline derived from the per-call timeout.
    pub fn for_request_timeout(request_timeout: Duration) -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            deadline: request_timeout.saturating_mul(2),
        }
    }

    /// Disable resending: the first loading body is returned immediately.
    pub const fn disabled() -> Self {
        Self {
            interval: Duration::ZERO,
            deadline: Duration::ZERO,
        }
    }

    pub fn expired(&self, started: Instant) -> bool {
        started.elapsed() >= self.deadline
    }
}

/// Polling cadence for a server-side job (compile or backtest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between two reads.
    pub interval: Duration,
    /// Overall budget; `None` polls until the job settles or the run is cancelled.
    pub timeout: Option<Duration>,
}

impl PollPolicy {
    pub const fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    /// Compile jobs: 1s cadence, bounded at five minutes.
    pub const fn compile() -> Self {
        Self::new(Duration::from_secs(1), Some(Duration::from_secs(300)))
    }

    /// Backtest jobs: 5s cadence, unbounded.
    pub const fn backtest() -> Self {
        Self::new(Duration::from_secs(5), None)
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub const fn unbounded(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn expired(&self, started: Instant) -> bool {
        self.timeout
            .map(|timeout| started.elapsed() >= timeout)
            .unwrap_or(false)
    }
}
