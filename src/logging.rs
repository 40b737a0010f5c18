//! # Structured logging.
//!
//! Components log through `tracing`; [`init`] installs a `tracing-subscriber`
//! formatter (text or JSON) filtered by an `EnvFilter` directive.
//!
//! Sensitive values are masked by a [`Redactor`] that components receive at
//! construction. It matches on field *names* from a configurable set, and can
//! additionally scrub known secret literals (a bot token embedded in a URL) out
//! of any value.
//!
//! ```rust
//! use pollvisor::logging::Redactor;
//!
//! let r = Redactor::new(["password"]).with_secret("s3cr3t");
//! assert_eq!(r.field("password", "hunter2"), "******");
//! assert_eq!(r.field("endpoint", "https://host/bots3cr3t/get"), "https://host/bot******/get");
//! assert_eq!(r.field("user", "alice"), "alice");
//! ```

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt as tfmt};

use crate::error::ConfigError;

/// Replacement text for masked values.
pub const MASK: &str = "******";

/// Output format of the log sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid {
                field: "log format",
                reason: format!("unknown format {other:?} (expected text or json)"),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// Settings for [`init`].
#[derive(Clone, Debug)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `pollvisor=debug,reqwest=warn`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Field names whose values are always masked.
    pub sensitive: Vec<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
            sensitive: Redactor::DEFAULT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Installs the global subscriber and returns the redactor for `settings`.
///
/// A second call keeps the first subscriber; it is not an error.
pub fn init(settings: &LogSettings) -> Result<Redactor, ConfigError> {
    let filter = EnvFilter::try_new(&settings.level).map_err(|e| ConfigError::Invalid {
        field: "log level",
        reason: e.to_string(),
    })?;

    let builder = tfmt().with_env_filter(filter).with_target(true);
    let installed = match settings.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }

    Ok(Redactor::new(&settings.sensitive))
}

/// Masks sensitive values before they reach the log sink.
#[derive(Clone, Debug)]
pub struct Redactor {
    keys: Arc<BTreeSet<String>>,
    secrets: Arc<Vec<String>>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEYS)
    }
}

impl Redactor {
    /// Field names masked when no explicit set is given.
    pub const DEFAULT_KEYS: &'static [&'static str] = &["password", "token"];

    /// Creates a redactor masking the given field names (case-insensitive).
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: Arc::new(
                keys.into_iter()
                    .map(|k| k.as_ref().trim().to_ascii_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            ),
            secrets: Arc::new(Vec::new()),
        }
    }

    /// Also scrubs occurrences of `secret` from every value.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            Arc::make_mut(&mut self.secrets).push(secret);
        }
        self
    }

    /// True if values under `key` are always masked.
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.keys.contains(&key.to_ascii_lowercase())
    }

    /// Returns `value` as it may be logged under `key`.
    pub fn field<'a>(&self, key: &str, value: &'a str) -> Cow<'a, str> {
        if self.is_sensitive(key) {
            return Cow::Borrowed(MASK);
        }
        let mut out = Cow::Borrowed(value);
        for secret in self.secrets.iter() {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), MASK));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_masks_password_and_token() {
        let r = Redactor::default();
        assert_eq!(r.field("password", "x"), MASK);
        assert_eq!(r.field("Token", "x"), MASK);
        assert_eq!(r.field("address", ":8080"), ":8080");
    }

    #[test]
    fn configured_keys_replace_defaults() {
        let r = Redactor::new(["api_key"]);
        assert_eq!(r.field("api_key", "k"), MASK);
        assert_eq!(r.field("password", "p"), "p");
    }

    #[test]
    fn empty_secret_is_ignored() {
        let r = Redactor::new(Vec::<String>::new()).with_secret("");
        assert_eq!(r.field("x", "abc"), "abc");
    }

    #[test]
    fn log_format_parses() {
        assert_eq!("JSON".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>().ok(), Some(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn init_rejects_bad_filter_and_tolerates_reinit() {
        let bad = LogSettings {
            level: "pollvisor=notalevel".into(),
            ..LogSettings::default()
        };
        assert!(init(&bad).is_err());
        assert!(init(&LogSettings::default()).is_ok());
        assert!(init(&LogSettings::default()).is_ok());
    }
}
