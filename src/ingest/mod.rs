//! Long-poll ingestion.
//!
//! ## Contents
//! - [`LongPoll`] the ingestion [`Task`](crate::Task)
//! - [`Cursor`] monotonic offset owned by the loop
//! - [`Fetch`] remote endpoint capability, [`HttpFetcher`] its HTTP implementation
//! - [`FetchRequest`], [`Update`] wire types
//! - [`PollConfig`] tuning
//! - [`transport`] HTTP client construction (transparent gzip)
//!
//! ## Wiring
//! ```text
//! HttpFetcher ──► LongPoll ──(mpsc, bounded)──► consumer
//!                    ▲
//!          Supervisor::register(Arc::new(long_poll))
//! ```

mod config;
mod cursor;
mod fetch;
mod poller;
pub mod transport;
mod wire;

pub use config::{MAX_LIMIT, PollConfig};
pub use cursor::Cursor;
pub use fetch::{Fetch, HttpFetcher};
pub use poller::LongPoll;
pub use wire::{FetchRequest, RawPayload, Update, decode};
