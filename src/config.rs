//! Client configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! Fixed at construction time and shared by the HTTP client and the CLI.
//! Nothing here is re-read after startup.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown APP_ENV: {0} (expected 'development' or 'production')")]
    UnknownMode(String),
}

/// Build/run mode. Development mode enables diagnostic logging of failed
/// responses before they are propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    #[must_use]
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    fn build_default() -> Self {
        if cfg!(debug_assertions) { Self::Development } else { Self::Production }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub mode: RunMode,
    pub with_credentials: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            mode: RunMode::build_default(),
            with_credentials: true,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `API_BASE_URL`: default `http://localhost:5000/api`
    /// - `API_TIMEOUT_MS`: default 10000
    /// - `APP_ENV`: `development` or `production`; follows the build profile when unset
    /// - `API_WITH_CREDENTIALS`: default true
    ///
    /// # Errors
    ///
    /// Returns an error if `APP_ENV` holds an unrecognized mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(non_empty_env("API_BASE_URL").as_deref());
        let timeout = Duration::from_millis(env_parse_u64("API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS));
        let mode = parse_mode(non_empty_env("APP_ENV").as_deref())?;
        let with_credentials = env_bool("API_WITH_CREDENTIALS").unwrap_or(true);

        Ok(Self { base_url, timeout, mode, with_credentials })
    }

    /// Replace the base URL, applying the same normalization as `from_env`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(Some(base_url));
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
    })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn normalize_base_url(raw: Option<&str>) -> String {
    let url = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_API_BASE_URL);
    url.trim_end_matches('/').to_owned()
}

fn parse_mode(raw: Option<&str>) -> Result<RunMode, ConfigError> {
    let Some(raw) = raw else {
        return Ok(RunMode::build_default());
    };
    match raw.to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(RunMode::Development),
        "production" | "prod" => Ok(RunMode::Production),
        _ => Err(ConfigError::UnknownMode(raw.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
