//! # pollvisor
//!
//! **Pollvisor** runs a fixed set of long-lived async tasks under one shared,
//! cancellable lifetime and drains them within a bounded grace period when the
//! process is asked to stop.
//!
//! It ships two tasks built on that runtime: a cursor-driven long-poll
//! ingestion loop ([`LongPoll`]) and, behind the `server` feature, a small
//! HTTP service ([`HttpServer`]).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   LongPoll   │   │   consumer   │   │  HttpServer  │
//!     │   (TaskRef)  │   │   (TaskFn)   │   │   (TaskRef)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - lifetime (CancellationToken, one child per task)               │
//! │  - TaskTracker (spawn + drain)                                    │
//! │  - AliveTracker (names still running, for the stuck report)       │
//! │  - Outcome (mutex-guarded, order-independent failure fold)        │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   task span #1       task span #2       task span #3
//!   run(lifetime)      run(lifetime)      run(lifetime)
//!        │                  │                  │
//!        └───── Result<(), TaskError> ─────────┘
//!                           ▼
//!                 Outcome::record(name, result)
//! ```
//!
//! ### Lifecycle
//! ```text
//! register(task) ──► spawned immediately
//!
//! wait(&[Terminate, Interrupt]):
//!   ├─► first stop signal, or lifetime cancelled elsewhere
//!   ├─► cancel lifetime (once)
//!   ├─► drain for at most `grace`
//!   │     └─ stuck tasks are logged by name and left running
//!   └─► Ok(()) | Err(RuntimeError::TaskFailures)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                      |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------|
//! | **Supervision**   | Shared lifetime, stop signals, bounded drain, failure fold.  | [`Supervisor`], [`StopSignal`]          |
//! | **Tasks**         | Long-running work stopped by its lifetime.                   | [`Task`], [`TaskFn`], [`TaskRef`]       |
//! | **Ingestion**     | Long-poll loop with a monotonic cursor and bounded handoff.  | [`LongPoll`], [`Fetch`], [`Cursor`]     |
//! | **Policies**      | Retry pacing after failed fetches.                           | [`RetryPolicy`], [`BackoffPolicy`]      |
//! | **Errors**        | Typed errors for tasks, the runtime, fetches and settings.   | [`TaskError`], [`RuntimeError`]         |
//! | **Logging**       | `tracing-subscriber` setup and sensitive-value masking.      | [`logging::init`], [`logging::Redactor`]|
//!
//! ## Optional features
//! - `server` (default): the [`HttpServer`] task and the `pollvisor-api` binary.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{Supervisor, SupervisorConfig, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::new(SupervisorConfig::new(Duration::from_millis(200)));
//!
//!     let hello: TaskRef = TaskFn::arc("hello", |lifetime: CancellationToken| async move {
//!         lifetime.cancelled().await;
//!         Ok::<_, TaskError>(())
//!     });
//!     sup.register(hello);
//!
//!     // A real binary passes `StopSignal::DEFAULT` and waits for SIGTERM.
//!     sup.shutdown();
//!     sup.wait(&[]).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod ingest;
pub mod logging;
mod policies;
pub mod settings;
mod tasks;

// ---- Public re-exports ----

pub use core::{StopSignal, Supervisor, SupervisorConfig, wait_for_stop};
pub use error::{ConfigError, FetchError, Failures, RuntimeError, TaskError, TaskFailure};
pub use ingest::{
    Cursor, Fetch, FetchRequest, HttpFetcher, LongPoll, MAX_LIMIT, PollConfig, RawPayload, Update,
    decode, transport,
};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use tasks::{Task, TaskFn, TaskRef};

// Optional: the HTTP-serving task.
// Enabled by default; disable with `--no-default-features`.
#[cfg(feature = "server")]
mod server;
#[cfg(feature = "server")]
pub use server::{HttpServer, Paginator, Product, ProductList, ServerConfig, router};
