//! Configuration for the travel planner.
//!
//! Everything has a default except the Groq API key, which is resolved in this order:
//!
//! 1. the secrets file (`TRIPLLM_SECRETS_FILE`, default `secrets.toml`), key `GROQ_API_KEY`
//! 2. the process environment, after a local `.env` file has been loaded into it
//!
//! | Variable               | Default                           |
//! |------------------------|-----------------------------------|
//! | `TRIPLLM_MODEL`        | `llama3-8b-8192`                  |
//! | `TRIPLLM_BASE_URL`     | `https://api.groq.com/openai/v1`  |
//! | `TRIPLLM_ADDR`         | `127.0.0.1:8501`                  |
//! | `TRIPLLM_SECRETS_FILE` | `secrets.toml`                    |
//!
//! # Example
//!
//! ```rust
//! use tripllm::config::PlannerConfig;
//!
//! let config = PlannerConfig::new("gsk-test");
//! assert_eq!(config.model, "llama3-8b-8192");
//! assert_eq!(config.max_round, 5);
//! ```

use crate::clients::groq::GROQ_BASE_URL;
use crate::pricing::ModelPrice;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Shown instead of the page when no key could be resolved.
pub const MISSING_API_KEY_MESSAGE: &str = "GROQ_API_KEY not found. Please set it in secrets.toml for deployment or in your .env file for local development.";

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";
pub const DEFAULT_DOTENV_FILE: &str = ".env";

/// One pass through the five agents.
pub const DEFAULT_MAX_ROUND: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}", MISSING_API_KEY_MESSAGE)]
    MissingApiKey,

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse secrets file {path}: {source}")]
    SecretsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid bind address '{value}': {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub bind_addr: SocketAddr,
    pub price: ModelPrice,
    pub max_round: usize,
}

impl PlannerConfig {
    /// Defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        PlannerConfig {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GROQ_BASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            price: ModelPrice::default(),
            max_round: DEFAULT_MAX_ROUND,
        }
    }

    /// Load `.env`, then resolve every setting from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let loaded = load_dotenv(Path::new(DEFAULT_DOTENV_FILE))?;
        if loaded > 0 {
            log::info!("loaded {} variables from {}", loaded, DEFAULT_DOTENV_FILE);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve every setting through `lookup`, which stands in for the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets_path = lookup("TRIPLLM_SECRETS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE));
        let api_key = resolve_api_key(&secrets_path, &lookup)?;

        let mut config = PlannerConfig::new(api_key);
        if let Some(model) = lookup("TRIPLLM_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        if let Some(base_url) = lookup("TRIPLLM_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url;
        }
        config.bind_addr = resolve_bind_addr(&lookup)?;
        Ok(config)
    }
}

/// `TRIPLLM_ADDR` through `lookup`, or [`DEFAULT_ADDR`].
///
/// Resolved on its own as well so the server can still come up and report a missing key.
pub fn resolve_bind_addr<F>(lookup: F) -> Result<SocketAddr, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let addr = lookup("TRIPLLM_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
    addr.trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddr {
            value: addr.clone(),
            source,
        })
}

/// Read `key` from a TOML secrets file. A missing file or key is `Ok(None)`.
pub fn read_secret(path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let secrets: toml::Table =
        toml::from_str(&contents).map_err(|source| ConfigError::SecretsParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(secrets
        .get(key)
        .and_then(|value| value.as_str())
        .map(str::to_string))
}

/// Secrets file first, then `lookup`. Empty values count as missing.
pub fn resolve_api_key<F>(secrets_path: &Path, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = read_secret(secrets_path, API_KEY_VAR)?.filter(|k| !k.is_empty()) {
        log::debug!("{} resolved from {}", API_KEY_VAR, secrets_path.display());
        return Ok(key);
    }
    match lookup(API_KEY_VAR).filter(|k| !k.is_empty()) {
        Some(key) => Ok(key),
        None => {
            log::error!("{}", MISSING_API_KEY_MESSAGE);
            Err(ConfigError::MissingApiKey)
        }
    }
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an `export ` prefix is
/// accepted and matching single or double quotes around the value are removed.
pub fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = ['"', '\'']
                .iter()
                .find_map(|q| {
                    value
                        .strip_prefix(*q)
                        .and_then(|v| v.strip_suffix(*q))
                })
                .unwrap_or(value);
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Copy the variables of a `.env` file into the process environment without overriding
/// anything already set. Returns how many variables were set; a missing file sets none.
pub fn load_dotenv(path: &Path) -> Result<usize, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut loaded = 0;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            loaded += 1;
        }
    }
    Ok(loaded)
}
