//! Console configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::forms::is_http_with_host;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const STATE_DIR_NAME: &str = "voice-of-faith-admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// REST API base URL without a trailing slash.
    pub api_url: String,
    pub timeouts: Timeouts,
    /// Directory holding persisted session and theme state.
    pub state_dir: PathBuf,
}

impl ConsoleConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `VOF_API_URL`: default `http://127.0.0.1:5000/api`
    /// - `VOF_REQUEST_TIMEOUT_SECS`: default 30
    /// - `VOF_CONNECT_TIMEOUT_SECS`: default 10
    /// - `VOF_STATE_DIR`: default `<platform config dir>/voice-of-faith-admin`
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not http(s), a timeout is not a
    /// positive integer, or no state directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(
            std::env::var("VOF_API_URL")
                .ok()
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse_secs("VOF_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_secs("VOF_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let state_dir = match std::env::var_os("VOF_STATE_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_state_dir()?,
        };

        Ok(Self { api_url, timeouts, state_dir })
    }

    /// Config pointing at `api_url` with default timeouts. Used by tests and
    /// embedders that manage their own storage location.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not http(s).
    pub fn for_api(api_url: &str, state_dir: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self { api_url: normalize_api_url(api_url)?, timeouts: Timeouts::default(), state_dir })
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
///
/// # Errors
///
/// Returns an error for empty or non-http(s) URLs.
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !Url::parse(trimmed).is_ok_and(|url| is_http_with_host(&url)) {
        return Err(ConfigError::Invalid { var: "VOF_API_URL", reason: format!("expected an http(s) URL, got `{raw}`") });
    }
    Ok(trimmed.to_owned())
}

fn env_parse_secs(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { var, reason: "must be greater than zero".to_owned() }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid { var, reason: e.to_string() }),
    }
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(STATE_DIR_NAME))
        .ok_or(ConfigError::NoStateDir)
}
