//! Runtime core: supervision, stop signals and drain.
//!
//! The public API from this module is [`Supervisor`], its [`SupervisorConfig`]
//! and the [`StopSignal`] set it listens for.
//!
//! Internal modules:
//! - [`supervisor`]: shared lifetime, registration, bounded drain;
//! - [`runner`]: runs one registered task inside its span and records the result;
//! - [`outcome`]: mutex-guarded failure aggregate;
//! - [`alive`]: running-task names for the stuck report;
//! - [`shutdown`]: OS signal listeners.

mod alive;
mod config;
mod outcome;
mod runner;
mod shutdown;
mod supervisor;

pub use config::SupervisorConfig;
pub use shutdown::{StopSignal, wait_for_stop};
pub use supervisor::Supervisor;
