use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{DriverError, Result};

/// Shared cancellation flag.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Limits for busy-wait status polling.
///
/// The default is unbounded: poll until the bit shows up, with no backoff.
/// Chip timing is sub-millisecond, but a dead chip then spins forever, so
/// long-running callers should set at least a cancel token.
#[derive(Debug, Clone, Default)]
pub struct PollOptions {
    /// Give up after this many status reads.
    pub max_attempts: Option<u64>,
    /// Give up once this much time has passed.
    pub timeout: Option<Duration>,
    /// Stop as soon as this token is cancelled.
    pub cancel: Option<CancelToken>,
}

impl PollOptions {
    /// Poll forever.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn start(&self) -> PollBudget<'_> {
        PollBudget {
            options: self,
            started: Instant::now(),
            attempts: 0,
        }
    }
}

/// Running account of one poll loop against its [`PollOptions`].
pub(crate) struct PollBudget<'a> {
    options: &'a PollOptions,
    started: Instant,
    attempts: u64,
}

impl PollBudget<'_> {
    /// Charge one attempt, or fail if the budget is spent.
    pub(crate) fn next_attempt(&mut self) -> Result<()> {
        if let Some(cancel) = &self.options.cancel {
            if cancel.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
        }
        let exhausted = self
            .options
            .max_attempts
            .is_some_and(|max| self.attempts >= max)
            || self
                .options
                .timeout
                .is_some_and(|timeout| self.started.elapsed() >= timeout);
        if exhausted {
            return Err(DriverError::PollLimit {
                attempts: self.attempts,
                elapsed: self.started.elapsed(),
            });
        }
        self.attempts += 1;
        Ok(())
    }

    pub(crate) fn attempts(&self) -> u64 {
        self.attempts
    }
}
