//! # Command-line settings for the binaries.
//!
//! Every flag falls back to an environment variable, then to a default.
//! Values are validated into the library's config types before anything runs.

use std::time::Duration;

use clap::{Args, Parser};

use crate::core::SupervisorConfig;
use crate::error::ConfigError;
use crate::ingest::PollConfig;
use crate::logging::{LogFormat, LogSettings, Redactor};

/// Logging flags shared by both binaries.
#[derive(Args, Clone, Debug)]
pub struct LogArgs {
    /// Filter directive, e.g. `info` or `pollvisor=debug`.
    #[arg(long = "log-level", env = "LOG_LEVEL", default_value = "info")]
    pub level: String,

    /// `text` or `json`.
    #[arg(long = "log-format", env = "LOG_FORMAT", default_value = "text")]
    pub format: String,

    /// Field names whose values are masked in logs.
    #[arg(
        long = "sensitive-fields",
        env = "SENSITIVE_FIELDS",
        value_delimiter = ',',
        default_values_t = Redactor::DEFAULT_KEYS.iter().map(|k| k.to_string()).collect::<Vec<_>>()
    )]
    pub sensitive: Vec<String>,
}

impl LogArgs {
    /// Converts into [`LogSettings`].
    pub fn to_log_settings(&self) -> Result<LogSettings, ConfigError> {
        Ok(LogSettings {
            level: self.level.clone(),
            format: self.format.parse::<LogFormat>()?,
            sensitive: self.sensitive.clone(),
        })
    }
}

/// Drain window flag shared by both binaries.
#[derive(Args, Clone, Debug)]
pub struct GraceArgs {
    /// Seconds to wait for tasks after a stop signal.
    #[arg(long = "grace-secs", env = "GRACE_SECS", default_value_t = 1)]
    pub grace_secs: u64,
}

impl GraceArgs {
    /// Supervisor config for these flags.
    pub fn supervisor(&self) -> SupervisorConfig {
        SupervisorConfig::new(Duration::from_secs(self.grace_secs))
    }
}

/// Flags of `pollvisor-api`.
#[derive(Parser, Clone, Debug)]
#[command(name = "pollvisor-api", version, about = "Serves the product listing over HTTP")]
pub struct ApiSettings {
    /// Listen address.
    #[arg(long, env = "ADDRESS", default_value = "localhost:8080")]
    pub address: String,

    /// Origin allowed by CORS.
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    #[command(flatten)]
    pub grace: GraceArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ApiSettings {
    /// Validated server config.
    #[cfg(feature = "server")]
    pub fn server(&self) -> Result<crate::server::ServerConfig, ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Missing("address"));
        }
        Ok(crate::server::ServerConfig {
            address: self.address.clone(),
            allowed_origin: self.allowed_origin.clone(),
        })
    }
}

/// Flags of `pollvisor-pool`.
#[derive(Parser, Clone, Debug)]
#[command(name = "pollvisor-pool", version, about = "Long-polls the bot API and logs every update")]
pub struct PoolSettings {
    /// Bot API token.
    #[arg(long, env = "TOKEN", hide_env_values = true, default_value = "")]
    pub token: String,

    /// Override of the getUpdates URL; the token is not used to build it when set.
    #[arg(long, env = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Batch size per request (1..=100).
    #[arg(long, env = "LIMIT", default_value_t = crate::ingest::MAX_LIMIT)]
    pub limit: u32,

    /// Server-side long-poll wait, in seconds.
    #[arg(long = "poll-timeout-secs", env = "POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout_secs: u64,

    #[command(flatten)]
    pub grace: GraceArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl PoolSettings {
    /// Validated poll config.
    pub fn poll(&self) -> Result<PollConfig, ConfigError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(ConfigError::Missing("token"));
        }
        let mut cfg = match &self.endpoint {
            Some(url) => PollConfig::new(url.clone()),
            None => PollConfig::telegram(token),
        };
        cfg.limit = self.limit;
        cfg.long_poll = Duration::from_secs(self.poll_timeout_secs);
        Ok(cfg)
    }
}
