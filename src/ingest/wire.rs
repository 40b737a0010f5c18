//! # Long-poll wire format.
//!
//! Request body:
//! ```json
//! { "offset": 8, "limit": 100, "timeout": 30 }
//! ```
//!
//! Response envelope (Bot API `getUpdates` shape):
//! ```json
//! { "ok": true, "result": [ { "update_id": 8, "message": { "text": "hi" } } ] }
//! { "ok": false, "error_code": 429, "description": "Too Many Requests",
//!   "parameters": { "retry_after": 3 } }
//! ```
//!
//! Every field of a result entry except `update_id` is the opaque payload.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One outbound fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Lowest identifier to return.
    pub offset: u64,
    /// Maximum number of items.
    pub limit: u32,
    /// Server-side long-poll wait, in whole seconds.
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,
}

/// One inbound item: identifier plus opaque payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update<P> {
    /// Strictly increasing identifier.
    #[serde(rename = "update_id")]
    pub id: u64,
    /// Everything else in the entry.
    #[serde(flatten)]
    pub payload: P,
}

/// Default opaque payload: the JSON object minus the identifier.
pub type RawPayload = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Deserialize)]
#[serde(bound = "P: DeserializeOwned")]
struct Envelope<P> {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default = "Vec::new")]
    result: Vec<Update<P>>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<Parameters>,
}

#[derive(Debug, Default, Deserialize)]
struct Parameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

fn default_ok() -> bool {
    true
}

/// Decodes a response body received with HTTP `status`.
pub fn decode<P: DeserializeOwned>(status: u16, body: &[u8]) -> Result<Vec<Update<P>>, FetchError> {
    if !(200..300).contains(&status) {
        let parsed = serde_json::from_slice::<Envelope<RawPayload>>(body).ok();
        let description = parsed
            .as_ref()
            .and_then(|e| e.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        if status == 429 {
            return Err(rate_limited(parsed.and_then(|e| e.parameters)));
        }
        return Err(FetchError::Status {
            status,
            description,
        });
    }

    let env: Envelope<P> = serde_json::from_slice(body)?;
    if env.ok {
        return Ok(env.result);
    }
    match env.error_code {
        Some(429) => Err(rate_limited(env.parameters)),
        code => Err(FetchError::Api {
            code: code.unwrap_or_default(),
            description: env
                .description
                .unwrap_or_else(|| "unknown api error".to_string()),
        }),
    }
}

fn rate_limited(params: Option<Parameters>) -> FetchError {
    let secs = params.and_then(|p| p.retry_after).unwrap_or(1).max(1);
    FetchError::RateLimited {
        retry_after: Duration::from_secs(secs),
    }
}
