//! # Supervisor configuration.

use std::time::Duration;

/// Settings for a [`Supervisor`](crate::Supervisor).
///
/// - `grace`: how long [`wait`](crate::Supervisor::wait) drains registered
///   tasks after cancelling the lifetime. `0s` returns right after cancelling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Upper bound on the drain after cancellation.
    pub grace: Duration,
}

impl SupervisorConfig {
    /// Creates a config with the given drain window.
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }
}

impl Default for SupervisorConfig {
    /// `grace = 1s`.
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(1),
        }
    }
}
