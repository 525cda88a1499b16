//! Bounded polling policy for export jobs

use std::time::Duration;

/// Fixed-interval polling policy with a hard attempt bound.
///
/// The export service gives no completion signal other than its job status,
/// so readiness is polled. A stalled job must not poll forever: once
/// `max_attempts` is exhausted the retrieval fails with a distinguishable
/// error and the caller decides whether to resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of status polls before giving up
    pub max_attempts: u32,
    /// Fixed delay between polls
    pub interval: Duration,
}

impl RetryPolicy {
    /// Create a polling policy
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the total time spent waiting between polls
    pub fn max_total_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    /// 60 attempts at 5 second intervals, bounding a poll cycle to
    /// roughly five minutes.
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
        }
    }
}
