//! # Long-poll ingestion loop.
//!
//! [`LongPoll`] is a [`Task`] that repeatedly asks a [`Fetch`] endpoint for the
//! items after its [`Cursor`], and hands each payload, in ascending identifier
//! order, to a consumer through a bounded channel.
//!
//! ```text
//!            ┌────────── empty batch / failed fetch (same offset) ──┐
//!            ▼                                                      │
//!   ┌──► Polling ── fetch(offset, limit, long_poll) ─────────────────┘
//!   │        │ non-empty batch
//!   │        ▼
//!   │    Delivering ── send(payload) per item, ascending id (backpressure)
//!   │        │ batch handed off
//!   └────────┘ cursor = max(id) + 1
//!
//!   lifetime cancelled (checked before every fetch and raced against every
//!   await) or consumer gone ──► Stopped: handoff sender dropped, Ok(())
//! ```
//!
//! ## Rules
//! - The cursor only moves after a whole batch has been handed off.
//! - A failed fetch never moves the cursor; the first failure retries at once,
//!   later ones follow [`RetryPolicy`](crate::RetryPolicy).
//! - Items with an identifier below the cursor were already delivered and are skipped.
//! - The handoff channel is closed exactly once, when the loop stops.

use std::borrow::Cow;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::ingest::config::PollConfig;
use crate::ingest::cursor::Cursor;
use crate::ingest::fetch::Fetch;
use crate::ingest::wire::{FetchRequest, Update};
use crate::logging::Redactor;
use crate::tasks::Task;

/// Why the loop entered `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Canceled,
    ConsumerGone,
}

enum Step<P> {
    Polling,
    Delivering(Vec<Update<P>>),
    Stopped(StopReason),
}

/// Loop-local state; owned by one `run` call.
#[derive(Debug, Default)]
struct Progress {
    cursor: Cursor,
    failures: u32,
    delivered: u64,
}

/// Cursor-driven long-poll task feeding a bounded handoff channel.
pub struct LongPoll<P, F> {
    name: Cow<'static, str>,
    fetcher: F,
    cfg: PollConfig,
    redactor: Redactor,
    handoff: Mutex<Option<mpsc::Sender<P>>>,
}

impl<P, F> LongPoll<P, F>
where
    P: Send + 'static,
    F: Fetch<P>,
{
    /// Creates the task and the consumer end of its handoff channel.
    ///
    /// The receiver yields `None` once the loop has stopped.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        fetcher: F,
        cfg: PollConfig,
    ) -> (Self, mpsc::Receiver<P>) {
        let (tx, rx) = mpsc::channel(cfg.handoff_capacity_clamped());
        let task = Self {
            name: name.into(),
            fetcher,
            cfg,
            redactor: Redactor::default(),
            handoff: Mutex::new(Some(tx)),
        };
        (task, rx)
    }

    /// Uses `redactor` for the values this task logs.
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PollConfig {
        &self.cfg
    }

    async fn drive(&self, lifetime: &CancellationToken, tx: &mpsc::Sender<P>) -> Progress {
        let mut progress = Progress::default();
        let mut step = Step::Polling;
        loop {
            step = match step {
                Step::Polling => self.poll(lifetime, &mut progress).await,
                Step::Delivering(batch) => self.deliver(lifetime, tx, &mut progress, batch).await,
                Step::Stopped(reason) => {
                    tracing::debug!(?reason, "long-poll loop stopping");
                    return progress;
                }
            };
        }
    }

    async fn poll(&self, lifetime: &CancellationToken, progress: &mut Progress) -> Step<P> {
        if lifetime.is_cancelled() {
            return Step::Stopped(StopReason::Canceled);
        }

        let req = FetchRequest {
            offset: progress.cursor.offset(),
            limit: self.cfg.effective_limit(),
            timeout_secs: self.cfg.long_poll_secs(),
        };
        let res = tokio::select! {
            biased;
            _ = lifetime.cancelled() => return Step::Stopped(StopReason::Canceled),
            res = self.fetcher.fetch(req) => res,
        };

        match res {
            Ok(batch) => {
                progress.failures = 0;
                if batch.is_empty() {
                    tracing::trace!(offset = req.offset, "empty batch");
                    Step::Polling
                } else {
                    Step::Delivering(batch)
                }
            }
            Err(e) => {
                progress.failures = progress.failures.saturating_add(1);
                let delay = self.cfg.retry.delay(progress.failures, e.retry_after());
                tracing::warn!(
                    offset = req.offset,
                    failures = progress.failures,
                    retry_in = ?delay,
                    label = e.as_label(),
                    error = %self.redactor.field("error", &e.to_string()),
                    "fetch failed"
                );
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = lifetime.cancelled() => return Step::Stopped(StopReason::Canceled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Step::Polling
            }
        }
    }

    async fn deliver(
        &self,
        lifetime: &CancellationToken,
        tx: &mpsc::Sender<P>,
        progress: &mut Progress,
        mut batch: Vec<Update<P>>,
    ) -> Step<P> {
        batch.sort_by_key(|u| u.id);
        let highest = batch.last().map(|u| u.id);
        let mut last_sent: Option<u64> = None;

        for update in batch {
            if progress.cursor.is_behind(update.id) || last_sent.is_some_and(|l| update.id <= l) {
                tracing::debug!(id = update.id, offset = %progress.cursor, "skipping delivered item");
                continue;
            }
            tokio::select! {
                biased;
                _ = lifetime.cancelled() => return Step::Stopped(StopReason::Canceled),
                res = tx.send(update.payload) => if res.is_err() {
                    tracing::info!(id = update.id, "consumer dropped the handoff channel");
                    return Step::Stopped(StopReason::ConsumerGone);
                },
            }
            last_sent = Some(update.id);
            progress.delivered += 1;
        }

        if progress.cursor.advance_past(highest) {
            tracing::debug!(offset = %progress.cursor, "cursor advanced");
        }
        Step::Polling
    }
}

#[async_trait]
impl<P, F> Task for LongPoll<P, F>
where
    P: Send + 'static,
    F: Fetch<P>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, lifetime: CancellationToken) -> Result<(), TaskError> {
        let tx = self
            .handoff
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| TaskError::fatal("handoff channel already closed by an earlier run"))?;

        tracing::info!(
            endpoint = %self.redactor.field("endpoint", &self.cfg.endpoint),
            limit = self.cfg.effective_limit(),
            long_poll = ?self.cfg.long_poll,
            "long-poll loop started"
        );

        let progress = self.drive(&lifetime, &tx).await;
        drop(tx);

        tracing::info!(
            offset = %progress.cursor,
            delivered = progress.delivered,
            "long-poll loop stopped; handoff closed"
        );
        Ok(())
    }
}

impl<P, F> std::fmt::Debug for LongPoll<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongPoll")
            .field("name", &self.name)
            .field("endpoint", &self.redactor.field("endpoint", &self.cfg.endpoint))
            .finish_non_exhaustive()
    }
}
