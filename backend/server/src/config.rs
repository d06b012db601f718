use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Error, Debug)]
#[error("invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub redis_url: String,
    pub redis_retries: usize,
    pub redis_timeout: Duration,
}

impl Config {
    /// Each key is read from `/run/secrets/<KEY>` first, then from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(secret_or_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "1111")?,
            store: try_load(&lookup, "STORE_BACKEND", "redis")?,
            redis_url: try_load(&lookup, "REDIS_URL", "redis://127.0.0.1:6379")?,
            redis_retries: try_load(&lookup, "REDIS_RETRIES", "1")?,
            redis_timeout: Duration::from_millis(try_load(&lookup, "REDIS_TIMEOUT_MS", "100")?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            store: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redis_retries: 1,
            redis_timeout: Duration::from_millis(100),
        }
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!("Invalid {key} value: {e}");
            Err(ConfigError {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}

fn secret_or_env(key: &str) -> Option<String> {
    read_secret(key).or_else(|| env::var(key).ok())
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).map(|s| s.trim().to_string()).ok()
}
