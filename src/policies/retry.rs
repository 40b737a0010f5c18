//! # Retry schedule for failed fetches.
//!
//! A long-poll loop that retries without pause can hammer a failing endpoint.
//! [`RetryPolicy`] maps the number of consecutive failures to a wait:
//!
//! ```text
//! failures = 1 → 0                         (when immediate_first)
//! failures = n → backoff.next(n - 2)       (when immediate_first)
//! failures = n → backoff.next(n - 1)       (otherwise)
//! ```
//!
//! A server-provided `retry_after` is a floor for the computed delay.

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// How long to wait after consecutive fetch failures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retry the first failure without waiting.
    pub immediate_first: bool,
    /// Delay growth for the following failures.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            immediate_first: true,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Retry immediately forever.
    pub fn immediate() -> Self {
        Self {
            immediate_first: true,
            backoff: BackoffPolicy::none(),
        }
    }

    /// Delay before the next request after `failures` consecutive failures.
    pub fn delay(&self, failures: u32, retry_after: Option<Duration>) -> Duration {
        let computed = match (failures, self.immediate_first) {
            (0, _) | (1, true) => Duration::ZERO,
            (n, true) => self.backoff.next(n - 2),
            (n, false) => self.backoff.next(n - 1),
        };
        retry_after.map_or(computed, |floor| computed.max(floor))
    }
}
