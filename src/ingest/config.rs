//! # Long-poll loop configuration.

use std::time::Duration;

use crate::policies::RetryPolicy;

/// Largest batch the endpoint accepts.
pub const MAX_LIMIT: u32 = 100;

/// Settings for [`LongPoll`](crate::LongPoll) and [`HttpFetcher`](crate::HttpFetcher).
#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
    /// URL of the long-poll endpoint.
    pub endpoint: String,
    /// Batch-size limit sent with every request (clamped to `1..=100`).
    pub limit: u32,
    /// Server-side long-poll wait.
    pub long_poll: Duration,
    /// Extra time the HTTP client waits beyond `long_poll`.
    pub request_slack: Duration,
    /// Pacing of retries after failed requests.
    pub retry: RetryPolicy,
    /// Capacity of the handoff channel (min 1).
    pub handoff_capacity: usize,
}

impl PollConfig {
    /// Config for a generic endpoint with default tuning.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            limit: MAX_LIMIT,
            long_poll: Duration::from_secs(30),
            request_slack: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            handoff_capacity: 1,
        }
    }

    /// Config for the Telegram Bot API `getUpdates` method.
    pub fn telegram(token: &str) -> Self {
        Self::new(format!("https://api.telegram.org/bot{token}/getUpdates"))
    }

    /// Batch limit clamped into the accepted range.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Long-poll wait in whole seconds, as sent on the wire.
    pub fn long_poll_secs(&self) -> u64 {
        self.long_poll.as_secs()
    }

    /// Total HTTP timeout for one request.
    pub fn request_timeout(&self) -> Duration {
        self.long_poll + self.request_slack
    }

    /// Handoff capacity clamped to at least 1.
    pub fn handoff_capacity_clamped(&self) -> usize {
        self.handoff_capacity.max(1)
    }
}
