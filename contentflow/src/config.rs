//! Process configuration read once at startup.
//!
//! All values come from environment variables (the binary loads `.env` first).
//! The provider API key is the only required value; its absence is fatal.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Author credited when `CONTENT_AUTHOR` is unset.
pub const DEFAULT_AUTHOR: &str = "Contentflow";

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<ConfigError> for crate::errors::ContentflowError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Which job store backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "backend")]
pub enum JobStoreBackend {
    /// Process-local map; records vanish on restart.
    #[default]
    Memory,
    /// One JSON file per job under a directory.
    File {
        /// Directory holding the job records.
        dir: PathBuf,
    },
    /// One JSON object per job in an S3 bucket.
    S3 {
        /// Bucket name.
        bucket: String,
    },
}

/// Settings for the chat-completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key (never serialized).
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API base URL (without the `/chat/completions` suffix).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl ProviderSettings {
    /// Creates provider settings with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Gets the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Complete process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Chat-completion provider settings.
    pub provider: ProviderSettings,
    /// HTTP listen port.
    pub port: u16,
    /// Directory for saved content.
    pub output_dir: PathBuf,
    /// Whether the HTML rendering stage runs.
    pub generate_html: bool,
    /// Delay between topics in batch mode, in milliseconds.
    pub batch_delay_ms: u64,
    /// Author credited in content metadata.
    pub author: String,
    /// Job store backend.
    pub job_store: JobStoreBackend,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `OPENAI_API_KEY` is unset and
    /// [`ConfigError::Invalid`] for unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let provider = ProviderSettings {
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(default_model),
            temperature: parse_or("OPENAI_TEMPERATURE", get("OPENAI_TEMPERATURE"), default_temperature())?,
            max_tokens: parse_or("OPENAI_MAX_TOKENS", get("OPENAI_MAX_TOKENS"), default_max_tokens())?,
            base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(default_base_url),
            timeout_secs: parse_or("OPENAI_TIMEOUT_SECS", get("OPENAI_TIMEOUT_SECS"), default_timeout_secs())?,
        };

        if !(0.0..=2.0).contains(&provider.temperature) {
            return Err(ConfigError::Invalid {
                name: "OPENAI_TEMPERATURE",
                value: provider.temperature.to_string(),
                reason: "must be between 0.0 and 2.0".to_string(),
            });
        }

        let job_store = match get("JOB_STORE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => JobStoreBackend::Memory,
            Some("file") => JobStoreBackend::File {
                dir: get("JOB_STORE_DIR").map_or_else(|| PathBuf::from("./jobs"), PathBuf::from),
            },
            Some("s3") => JobStoreBackend::S3 {
                bucket: get("JOB_BUCKET").ok_or(ConfigError::Missing("JOB_BUCKET"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "JOB_STORE",
                    value: other.to_string(),
                    reason: "expected memory, file or s3".to_string(),
                })
            }
        };

        Ok(Self {
            provider,
            port: parse_or("PORT", get("PORT"), 3000)?,
            output_dir: get("OUTPUT_DIR").map_or_else(|| PathBuf::from("./output"), PathBuf::from),
            generate_html: parse_bool("GENERATE_HTML", get("GENERATE_HTML"), true)?,
            batch_delay_ms: parse_or("BATCH_DELAY_MS", get("BATCH_DELAY_MS"), 2000)?,
            author: get("CONTENT_AUTHOR").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            job_store,
            log_format: parse_or("LOG_FORMAT", get("LOG_FORMAT"), LogFormat::Pretty)?,
        })
    }

    /// Gets the batch delay as a Duration.
    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool(name: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name,
                value: v,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
