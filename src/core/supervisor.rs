//! # Supervisor: shared lifetime, task registration, bounded drain.
//!
//! The [`Supervisor`] owns one cancellable lifetime. Every registered task runs
//! on its own tokio task against a child of that lifetime. [`Supervisor::wait`]
//! blocks until a stop signal arrives (or the lifetime is cancelled by other
//! means), cancels the lifetime once, then drains for at most
//! [`SupervisorConfig::grace`].
//!
//! ```text
//! register(task) ──► TaskTracker::spawn(Runner { task, lifetime.child_token() })
//!                         └─► task.run(lifetime) ──► Outcome::record(name, result)
//!
//! wait(signals):
//!   select { wait_for_stop(signals), lifetime.cancelled() }
//!     └─► cancel lifetime (exactly once; broadcast to every task)
//!     └─► tracker.close(); timeout(grace, tracker.wait())
//!            ├─ all finished   → log "all tasks stopped within grace"
//!            └─ grace exceeded → log stuck task names (tasks keep running)
//!     └─► Outcome::snapshot()  → Ok(()) | Err(RuntimeError::TaskFailures)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{Supervisor, SupervisorConfig, TaskFn, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = Supervisor::new(SupervisorConfig::new(Duration::from_secs(1)));
//!
//!     sup.register(TaskFn::arc("ticker", |lifetime: CancellationToken| async move {
//!         while !lifetime.is_cancelled() {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok::<(), TaskError>(())
//!     }));
//!
//!     // Stop programmatically instead of waiting for SIGTERM.
//!     sup.shutdown();
//!     assert!(sup.wait(&[]).await.is_ok());
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Span;

use crate::core::{
    alive::AliveTracker,
    config::SupervisorConfig,
    outcome::Outcome,
    runner::Runner,
    shutdown::{StopSignal, wait_for_stop},
};
use crate::error::RuntimeError;
use crate::tasks::TaskRef;

/// Coordinates registered tasks, stop signals and the bounded drain.
#[derive(Debug)]
pub struct Supervisor {
    cfg: SupervisorConfig,
    lifetime: CancellationToken,
    tracker: TaskTracker,
    alive: Arc<AliveTracker>,
    outcome: Arc<Outcome>,
    stopping: AtomicBool,
    span: Span,
}

impl Supervisor {
    /// Creates a supervisor with a fresh, live lifetime.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            lifetime: CancellationToken::new(),
            tracker: TaskTracker::new(),
            alive: Arc::new(AliveTracker::new()),
            outcome: Arc::new(Outcome::new()),
            stopping: AtomicBool::new(false),
            span: tracing::info_span!("supervisor", pid = std::process::id()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Returns a handle to the shared lifetime.
    ///
    /// Cancelling it has the same effect as a stop signal.
    pub fn lifetime(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    /// Cancels the shared lifetime without waiting for a signal.
    pub fn shutdown(&self) {
        self.lifetime.cancel();
    }

    /// Starts `task` immediately on its own tokio task.
    ///
    /// The task counts as running from this call on, even before its first poll.
    /// Must be called from within a tokio runtime. The task's result is folded
    /// into the outcome returned by [`wait`](Self::wait); it is never returned here.
    pub fn register(&self, task: TaskRef) {
        tracing::debug!(parent: &self.span, task = task.name(), "task registered");
        let runner = Runner {
            alive: self.alive.enter(task.name()),
            task,
            lifetime: self.lifetime.child_token(),
            outcome: Arc::clone(&self.outcome),
            parent: self.span.clone(),
        };
        self.tracker.spawn(runner.run());
    }

    /// Blocks until one of `signals` arrives or the lifetime is cancelled, then
    /// cancels the lifetime and drains registered tasks for at most `grace`.
    ///
    /// Returns the failures folded by the time the drain ended. Tasks still
    /// running after `grace` are logged and left running.
    pub async fn wait(&self, signals: &[StopSignal]) -> Result<(), RuntimeError> {
        self.wait_for_trigger(signals).await;
        self.begin_shutdown();
        self.drain().await;
        self.outcome.snapshot()
    }

    async fn wait_for_trigger(&self, signals: &[StopSignal]) {
        tokio::select! {
            res = wait_for_stop(signals) => match res {
                Ok(sig) => tracing::info!(parent: &self.span, signal = %sig, "stop signal received"),
                Err(e) => {
                    tracing::error!(parent: &self.span, error = %e, "cannot install signal listeners; waiting for lifetime cancellation");
                    self.lifetime.cancelled().await;
                }
            },
            _ = self.lifetime.cancelled() => {}
        }
    }

    /// Cancels the lifetime; the log line is written by the first caller only.
    fn begin_shutdown(&self) {
        if !self.stopping.swap(true, Ordering::AcqRel) {
            tracing::info!(parent: &self.span, grace = ?self.cfg.grace, "shutdown requested");
        }
        self.lifetime.cancel();
    }

    async fn drain(&self) {
        self.tracker.close();
        match tokio::time::timeout(self.cfg.grace, self.tracker.wait()).await {
            Ok(()) => tracing::info!(parent: &self.span, "all tasks stopped within grace"),
            Err(_) => {
                let stuck = self.alive.snapshot();
                tracing::warn!(
                    parent: &self.span,
                    grace = ?self.cfg.grace,
                    stuck = ?stuck,
                    "grace exceeded; abandoning running tasks"
                );
            }
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}
