//! # Task capability.
//!
//! A [`Task`] is any unit of long-running work with a single operation:
//! run until told to stop, then report the outcome. The supervisor hands
//! every task a child of its shared lifetime ([`CancellationToken`]).

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// Implementations must return promptly once `lifetime` is cancelled.
/// Returning [`TaskError::Canceled`] or `Ok(())` after cancellation are both
/// treated as a clean exit.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use pollvisor::{Task, TaskError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Task for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, lifetime: CancellationToken) -> Result<(), TaskError> {
///         lifetime.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Runs until completion or until `lifetime` is cancelled.
    async fn run(&self, lifetime: CancellationToken) -> Result<(), TaskError>;
}
