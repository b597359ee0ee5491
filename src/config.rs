//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first (if present), then
//! the `PANTRY_*` variables are read. Every setting has a default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default backend origin.
pub const DEFAULT_API_BASE: &str = "http://localhost:5001";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gemma:2b";
/// Default frame sampling period.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_millis(200);

/// Settings for one run of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Origin of the recipe assistant backend, without a trailing slash.
    pub api_base: String,
    /// Model identifier sent with chat requests.
    pub model: String,
    /// Period between sampled frames.
    pub scan_interval: Duration,
    /// Consecutive decode failures that end a session; `None` retries until
    /// cancelled.
    pub decode_failure_limit: Option<u32>,
    /// Path or name of the `zbarimg` executable.
    pub zbarimg: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            scan_interval: DEFAULT_SCAN_INTERVAL,
            decode_failure_limit: None,
            zbarimg: PathBuf::from("zbarimg"),
        }
    }
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup("PANTRY_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("PANTRY_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("PANTRY_SCAN_INTERVAL_MS") {
            let millis = parse_positive("PANTRY_SCAN_INTERVAL_MS", &raw)?;
            config.scan_interval = Duration::from_millis(u64::from(millis));
        }
        if let Some(raw) = lookup("PANTRY_DECODE_FAILURE_LIMIT") {
            config.decode_failure_limit = Some(parse_positive("PANTRY_DECODE_FAILURE_LIMIT", &raw)?);
        }
        if let Some(path) = lookup("PANTRY_ZBARIMG") {
            config.zbarimg = PathBuf::from(path);
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "expected a positive integer",
        }),
    }
}
