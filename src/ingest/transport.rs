//! # Outbound transport.
//!
//! The fetch loop talks to its endpoint through a `reqwest::Client` built here.
//! Compression is transparent: the client advertises `Accept-Encoding: gzip`
//! and decodes compressed bodies before they reach [`wire::decode`](super::wire::decode).
//! The request timeout covers the server-side long-poll wait plus slack.

use reqwest::Client;

use crate::error::FetchError;
use crate::ingest::config::PollConfig;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client used by [`HttpFetcher`](crate::HttpFetcher).
pub fn client(cfg: &PollConfig) -> Result<Client, FetchError> {
    Ok(Client::builder()
        .gzip(true)
        .timeout(cfg.request_timeout())
        .user_agent(USER_AGENT)
        .build()?)
}
