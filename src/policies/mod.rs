//! Retry pacing for the ingestion loop.
//!
//! ## Contents
//! - [`RetryPolicy`] which consecutive failure waits how long
//! - [`BackoffPolicy`] how delays grow (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization to keep many pollers from retrying in lockstep
//!
//! ## Defaults
//! - First failure retries immediately; later failures back off.
//! - `BackoffPolicy::default()` → first=250ms, factor=2.0, max=30s, jitter=Equal.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
