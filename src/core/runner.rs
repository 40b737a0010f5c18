//! # Run one registered task.
//!
//! Wraps a [`Task`] run with what the supervisor needs around it:
//!
//! ```text
//! (alive guard taken at registration) ─► log "task started"
//!   └─► task.run(lifetime)   (panic caught and turned into TaskError::Fatal)
//!         ├─ Ok / Canceled ─► log "task stopped"
//!         └─ Err           ─► log "task failed"
//! ─► fold result into outcome ─► leave alive tracker
//! ```
//!
//! The whole run executes inside a `task` span nested under the supervisor span.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::core::{alive::AliveGuard, outcome::Outcome};
use crate::error::TaskError;
use crate::tasks::TaskRef;

/// Everything one registered run needs; cheap to build per registration.
pub(crate) struct Runner {
    pub(crate) task: TaskRef,
    pub(crate) lifetime: CancellationToken,
    /// Held for the whole run; dropping it marks the task finished.
    pub(crate) alive: AliveGuard,
    pub(crate) outcome: Arc<Outcome>,
    pub(crate) parent: Span,
}

impl Runner {
    /// Runs the task to completion and records its result.
    pub(crate) async fn run(self) {
        let name = self.task.name().to_string();
        let span = tracing::info_span!(parent: &self.parent, "task", name = %name);

        async move {
            let _alive = self.alive;
            tracing::debug!("task started");

            let res = match AssertUnwindSafe(self.task.run(self.lifetime))
                .catch_unwind()
                .await
            {
                Ok(res) => res,
                Err(panic) => Err(TaskError::fatal(panic_message(panic.as_ref()))),
            };

            match &res {
                Ok(()) | Err(TaskError::Canceled) => tracing::info!("task stopped"),
                Err(e) => tracing::error!(label = e.as_label(), error = %e, "task failed"),
            }
            self.outcome.record(&name, res);
        }
        .instrument(span)
        .await
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
