//! Error types used by the pollvisor runtime, its tasks and the ingestion loop.
//!
//! - [`TaskError`]: how a single registered task ended.
//! - [`Failures`]: the folded set of task errors observed by the supervisor.
//! - [`RuntimeError`]: what [`Supervisor::wait`](crate::Supervisor::wait) surfaces.
//! - [`FetchError`]: one failed long-poll request (logged, never raised).
//! - [`ConfigError`]: invalid settings detected at startup.
//!
//! Every enum exposes `as_label` for logs.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by task execution.
///
/// Returned from [`Task::run`](crate::Task::run). `Canceled` is a graceful exit
/// and is never folded into the supervisor outcome.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Non-recoverable error; the task cannot run again.
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed lifetime cancellation and stopped.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`TaskError::Fatal`].
    pub fn fatal(error: impl fmt::Display) -> Self {
        TaskError::Fatal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use pollvisor::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// True for the graceful cancellation variant.
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// One task's contribution to the aggregated outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Name of the task that failed.
    pub task: String,
    /// The error it returned.
    pub error: TaskError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.task, self.error)
    }
}

/// Folded task errors, ordered by task name and message.
///
/// The order is independent of completion order, so two supervisors that saw
/// the same failures in different interleavings compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failures(Vec<TaskFailure>);

impl Failures {
    pub(crate) fn from_unordered(mut items: Vec<TaskFailure>) -> Self {
        items.sort_by(|a, b| {
            a.task
                .cmp(&b.task)
                .then_with(|| a.error.to_string().cmp(&b.error.to_string()))
        });
        Self(items)
    }

    /// Number of folded failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no task failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the failures in their canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskFailure> {
        self.0.iter()
    }

    /// Consumes the set and returns the failures.
    pub fn into_vec(self) -> Vec<TaskFailure> {
        self.0
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a TaskFailure;
    type IntoIter = std::slice::Iter<'a, TaskFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// # Errors surfaced by the supervisor.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// One or more registered tasks returned an error before the drain ended.
    #[error("{0}")]
    TaskFailures(Failures),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::TaskFailures(_) => "runtime_task_failures",
        }
    }

    /// Failures folded into this error.
    pub fn failures(&self) -> &Failures {
        match self {
            RuntimeError::TaskFailures(f) => f,
        }
    }
}

/// # Errors of a single long-poll request.
///
/// The ingestion loop logs these and retries; they never reach the supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or protocol failure.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not a valid envelope.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// Non-success HTTP status.
    #[error("http status {status}: {description}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided description or raw body.
        description: String,
    },

    /// Envelope reported `ok: false`.
    #[error("api error {code}: {description}")]
    Api {
        /// Error code from the envelope.
        code: i64,
        /// Error description from the envelope.
        description: String,
    },

    /// Remote endpoint asked us to slow down.
    #[error("rate limited; retry after {retry_after:?}")]
    RateLimited {
        /// Minimum wait requested by the server.
        retry_after: Duration,
    },
}

impl FetchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "fetch_transport",
            FetchError::Decode(_) => "fetch_decode",
            FetchError::Status { .. } => "fetch_status",
            FetchError::Api { .. } => "fetch_api",
            FetchError::RateLimited { .. } => "fetch_rate_limited",
        }
    }

    /// Server-requested minimum delay before the next request, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// # Invalid startup configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required value is empty.
    #[error("{0} is empty")]
    Missing(&'static str),

    /// A value could not be used.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Missing(_) => "config_missing",
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(task: &str, msg: &str) -> TaskFailure {
        TaskFailure {
            task: task.into(),
            error: TaskError::fail(msg),
        }
    }

    #[test]
    fn failures_are_order_independent() {
        let a = Failures::from_unordered(vec![failure("b", "x"), failure("a", "y")]);
        let b = Failures::from_unordered(vec![failure("a", "y"), failure("b", "x")]);
        assert_eq!(a, b);
        assert_eq!(a.iter().next().map(|f| f.task.as_str()), Some("a"));
    }

    #[test]
    fn failures_display_one_per_line() {
        let f = Failures::from_unordered(vec![failure("api", "bind"), failure("pool", "gone")]);
        assert_eq!(
            f.to_string(),
            "api: execution failed: bind\npool: execution failed: gone"
        );
    }

    #[test]
    fn rate_limited_exposes_retry_after() {
        let e = FetchError::RateLimited {
            retry_after: Duration::from_secs(3),
        };
        assert_eq!(e.retry_after(), Some(Duration::from_secs(3)));
        assert_eq!(e.as_label(), "fetch_rate_limited");
    }
}
