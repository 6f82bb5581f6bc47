use std::{env, time::Duration};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("CHORES_API_BASE_URL must start with http:// or https://, got {0:?}")]
    BaseUrl(String),
}

/// Settings for the remote chores API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    /// Extra attempts for GET requests; writes are never retried.
    pub read_retries: u32,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            read_retries: 0,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub client: ClientConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("CHORES_API_BASE_URL").unwrap_or_else(|| {
            info!("CHORES_API_BASE_URL not set, using {DEFAULT_API_BASE_URL}");
            DEFAULT_API_BASE_URL.to_string()
        });
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::BaseUrl(base_url));
        }

        let mut client = ClientConfig::new(base_url);
        client.token = lookup("CHORES_API_TOKEN").filter(|token| !token.trim().is_empty());
        client.timeout = Duration::from_millis(parse_or(
            &lookup,
            "CHORES_API_TIMEOUT_MS",
            "milliseconds value",
            DEFAULT_TIMEOUT_MS,
        )?);
        client.read_retries = parse_or(&lookup, "CHORES_READ_RETRIES", "retry count", 0)?;

        Ok(Self {
            port: parse_or(&lookup, "PORT", "port number", DEFAULT_PORT)?,
            client,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
    }
}
