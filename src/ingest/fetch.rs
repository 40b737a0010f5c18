//! # Remote fetch capability.
//!
//! [`Fetch`] is what the loop needs from the remote side: one request in, one
//! batch (or error) out. [`HttpFetcher`] is the HTTP implementation; tests use
//! in-memory fetchers.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::ingest::config::PollConfig;
use crate::ingest::transport;
use crate::ingest::wire::{self, FetchRequest, Update};

/// A long-poll endpoint.
///
/// Dropping the returned future must abandon the request; the loop drops it
/// when the lifetime is cancelled mid-flight.
#[async_trait]
pub trait Fetch<P>: Send + Sync + 'static {
    /// Returns the items at or after `req.offset`, at most `req.limit` of them.
    async fn fetch(&self, req: FetchRequest) -> Result<Vec<Update<P>>, FetchError>;
}

/// HTTP long-poll client: POSTs the request as JSON and decodes the envelope.
#[derive(Debug)]
pub struct HttpFetcher<P> {
    client: Client,
    endpoint: String,
    _payload: PhantomData<fn() -> P>,
}

impl<P> HttpFetcher<P> {
    /// Builds a fetcher with its own client (see [`transport::client`]).
    pub fn new(cfg: &PollConfig) -> Result<Self, FetchError> {
        Ok(Self::with_client(transport::client(cfg)?, cfg.endpoint.clone()))
    }

    /// Builds a fetcher on top of an existing client.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            _payload: PhantomData,
        }
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<P> Fetch<P> for HttpFetcher<P>
where
    P: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, req: FetchRequest) -> Result<Vec<Update<P>>, FetchError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&req)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        wire::decode(status, &body)
    }
}
