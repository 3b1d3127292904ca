//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TOOLKIT_ENGINE_HOME` - Directory for persisted JSON (default: `~/.toolkit_engine`)
//! - `TOOLKIT_REQUEST_TIMEOUT_SECS` - Per-attempt request timeout (default: 10.0)
//! - `TOOLKIT_MAX_RETRIES` - Attempts per request (default: 3)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::client::{ClientOptions, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT};

/// Overrides the storage directory.
pub const HOME_ENV: &str = "TOOLKIT_ENGINE_HOME";
const TIMEOUT_ENV: &str = "TOOLKIT_REQUEST_TIMEOUT_SECS";
const MAX_RETRIES_ENV: &str = "TOOLKIT_MAX_RETRIES";

/// Directory name under the user's home when no override is set.
const DEFAULT_DIR_NAME: &str = ".toolkit_engine";

/// Configuration and persistence errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Could not determine home directory; set {HOME_ENV}")]
    NoHomeDir,

    /// A persisted file is absent.
    #[error("Config file not found: {path}. {hint}")]
    NotFound { path: PathBuf, hint: String },

    /// A persisted file exists but is not the expected JSON.
    #[error("Invalid JSON in {path}: {message}")]
    InvalidJson { path: PathBuf, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runtime settings shared by the CLI and library entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Where products, specs, capabilities and mappings are stored.
    pub home: PathBuf,
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
    /// Attempts per request.
    pub max_retries: u32,
}

impl EngineConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but invalid, or no home
    /// directory can be found.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let home = match lookup(HOME_ENV).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_home()?,
        };

        let request_timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };

        let max_retries = match lookup(MAX_RETRIES_ENV) {
            Some(raw) => parse_max_retries(&raw)?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Self {
            home,
            request_timeout,
            max_retries,
        })
    }

    /// Defaults rooted at `home`.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            request_timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Client options carrying these timeouts and retries.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.request_timeout,
            max_retries: self.max_retries,
            ..ClientOptions::default()
        }
    }
}

fn default_home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar(TIMEOUT_ENV.to_string(), reason.to_string());
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("must be a number of seconds"))?;
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| invalid("must be a positive number of seconds"))
}

fn parse_max_retries(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                MAX_RETRIES_ENV.to_string(),
                "must be a positive integer".to_string(),
            )
        })
}
