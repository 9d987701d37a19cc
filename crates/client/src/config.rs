//! Client configuration
//!
//! Loads configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, reads `THREADLOOM_*` environment variables (a `.env` file is
//!    honored via `dotenvy`)
//! 2. If no variable is set, probes for a config file
//! 3. Falls back to built-in defaults
//!
//! ## Environment Variables
//! - `THREADLOOM_API_BASE_URL`: API host, no trailing path
//! - `THREADLOOM_LINK_BASE_URL`: human-facing link host used only to build
//!   shareable URLs
//! - `THREADLOOM_TIMEOUT_SECS`: per-request deadline in seconds
//! - `THREADLOOM_RETRY_BACKOFF_MS`: fixed backoff before the single retry
//! - `THREADLOOM_USER_AGENT`: User-Agent header value
//!
//! The access token is deliberately not part of this struct; it loads
//! separately through [`crate::auth`] so configuration can be logged freely.
//!
//! ## File Locations
//! The loader probes (in order): `./threadloom.toml`, `./threadloom.json`,
//! `./config.toml`, `./config.json`, then the same names one directory up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use threadloom_domain::{Result, ThreadLoomError};
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://api.threadloom.app";
const DEFAULT_LINK_BASE_URL: &str = "https://threadloom.app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_USER_AGENT: &str = concat!("threadloom-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`crate::ThreadClient`]
///
/// Immutable once constructed; passed explicitly to every call site. There
/// is no ambient/global lookup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API host (e.g. `https://api.threadloom.app`)
    pub api_base_url: String,
    /// Base URL of the human-facing link host, distinct from the API host
    pub link_base_url: String,
    /// Per-request deadline, applied to every call
    pub timeout: Duration,
    /// Fixed backoff before the single automatic retry
    pub retry_backoff: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            link_base_url: DEFAULT_LINK_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Load configuration with automatic fallback strategy
///
/// Environment variables win; a config file is consulted only when no
/// `THREADLOOM_*` variable is set; otherwise defaults apply.
///
/// # Errors
/// Returns `ThreadLoomError::Config` if a source is present but invalid.
pub fn load() -> Result<ClientConfig> {
    dotenvy::dotenv().ok();

    if env_is_present() {
        tracing::info!("configuration loaded from environment variables");
        return load_from_env();
    }

    if let Some(path) = probe_config_paths() {
        tracing::info!(path = %path.display(), "configuration loaded from file");
        return load_from_file(&path);
    }

    tracing::debug!("no configuration source found, using defaults");
    Ok(ClientConfig::default())
}

/// Load configuration from environment variables, with defaults for any
/// variable that is not set.
///
/// # Errors
/// Returns `ThreadLoomError::Config` if a set variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let api_base_url =
        env_or("THREADLOOM_API_BASE_URL", defaults.api_base_url);
    let link_base_url =
        env_or("THREADLOOM_LINK_BASE_URL", defaults.link_base_url);
    let timeout_secs = env_parsed("THREADLOOM_TIMEOUT_SECS")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let backoff_ms = env_parsed("THREADLOOM_RETRY_BACKOFF_MS")?
        .unwrap_or(DEFAULT_RETRY_BACKOFF_MS);
    let user_agent = env_or("THREADLOOM_USER_AGENT", defaults.user_agent);

    let config = ClientConfig {
        api_base_url,
        link_base_url,
        timeout: Duration::from_secs(timeout_secs),
        retry_backoff: Duration::from_millis(backoff_ms),
        user_agent,
    };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// Supports JSON and TOML, detected by extension. Missing fields take their
/// default values.
///
/// # Errors
/// Returns `ThreadLoomError::Config` if the file is missing, the format is
/// unsupported, or parsing fails.
pub fn load_from_file(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Err(ThreadLoomError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ThreadLoomError::Config(format!("failed to read config file: {e}")))?;

    let file: FileConfig = match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
        "toml" => toml::from_str(&contents)
            .map_err(|e| ThreadLoomError::Config(format!("invalid TOML config: {e}")))?,
        "json" => serde_json::from_str(&contents)
            .map_err(|e| ThreadLoomError::Config(format!("invalid JSON config: {e}")))?,
        other => {
            return Err(ThreadLoomError::Config(format!(
                "unsupported config format: {other}"
            )))
        }
    };

    let defaults = ClientConfig::default();
    let config = ClientConfig {
        api_base_url: file.api_base_url.unwrap_or(defaults.api_base_url),
        link_base_url: file.link_base_url.unwrap_or(defaults.link_base_url),
        timeout: file
            .timeout_secs
            .map_or(defaults.timeout, Duration::from_secs),
        retry_backoff: file
            .retry_backoff_ms
            .map_or(defaults.retry_backoff, Duration::from_millis),
        user_agent: file.user_agent.unwrap_or(defaults.user_agent),
    };
    validate(&config)?;
    Ok(config)
}

/// Probe standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for name in ["threadloom.toml", "threadloom.json", "config.toml", "config.json"] {
            candidates.push(cwd.join(name));
        }
        for name in ["threadloom.toml", "threadloom.json", "config.toml", "config.json"] {
            candidates.push(cwd.join("..").join(name));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// On-disk configuration shape; every field optional.
#[derive(Debug, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    link_base_url: Option<String>,
    timeout_secs: Option<u64>,
    retry_backoff_ms: Option<u64>,
    user_agent: Option<String>,
}

fn validate(config: &ClientConfig) -> Result<()> {
    for (name, value) in [
        ("api base URL", &config.api_base_url),
        ("link base URL", &config.link_base_url),
    ] {
        let url = Url::parse(value)
            .map_err(|e| ThreadLoomError::Config(format!("invalid {name} {value:?}: {e}")))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ThreadLoomError::Config(format!(
                "invalid {name} {value:?}: scheme must be http(s)"
            )));
        }
    }
    if config.timeout.is_zero() {
        return Err(ThreadLoomError::Config("timeout must be non-zero".into()));
    }
    Ok(())
}

fn env_is_present() -> bool {
    [
        "THREADLOOM_API_BASE_URL",
        "THREADLOOM_LINK_BASE_URL",
        "THREADLOOM_TIMEOUT_SECS",
        "THREADLOOM_RETRY_BACKOFF_MS",
        "THREADLOOM_USER_AGENT",
    ]
    .iter()
    .any(|key| std::env::var_os(key).is_some())
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ThreadLoomError::Config(format!("invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
