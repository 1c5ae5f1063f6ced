//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_BASE_URL: &str = "https://consult-api.itheima.net/";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const SESSION_FILE_NAME: &str = "cp-user.json";
const APP_DIR: &str = "consult-client";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin every request path is resolved against. Always ends in `/`.
    pub base_url: Url,
    /// Applied uniformly to every request.
    pub timeout: Duration,
    /// Durable location of the persisted session.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CONSULT_BASE_URL`: default `https://consult-api.itheima.net/`
    /// - `CONSULT_SESSION_FILE`: default `<data dir>/consult-client/cp-user.json`
    ///
    /// # Errors
    ///
    /// Returns an error if `CONSULT_BASE_URL` is not an absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup("CONSULT_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = parse_base_url(&raw_base)?;
        let session_file = lookup("CONSULT_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(default_session_file, PathBuf::from);

        Ok(Self { base_url, timeout: REQUEST_TIMEOUT, session_file })
    }
}

/// Parse a base URL and force a trailing slash so relative joins keep the
/// full base path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') { trimmed.to_owned() } else { format!("{trimmed}/") };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: e.to_string() })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: "not a base URL".to_owned() });
    }
    Ok(url)
}

fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join(SESSION_FILE_NAME)
}
