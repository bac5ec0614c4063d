//! Client configuration: auth-service base address, token slot, timeout.
//!
//! In the browser there is no process environment, so `from_env` falls back to
//! values captured at build time via `option_env!`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "token";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid AUTH_API_BASE_URL '{0}' (expected http(s):// or a root-relative path)")]
    InvalidBaseUrl(String),

    #[error("invalid AUTH_REQUEST_TIMEOUT_SECS '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Base address every gateway path is appended to; never ends with `/`.
    pub api_base_url: String,
    /// `localStorage` key holding the session token.
    pub token_storage_key: String,
    /// Per-request deadline; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_owned(),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

impl AuthConfig {
    /// Build config from the environment.
    ///
    /// Optional:
    /// - `AUTH_API_BASE_URL`: default `http://localhost:8080/api/v1`
    /// - `AUTH_TOKEN_STORAGE_KEY`: default `token`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 30, `0` disables the deadline
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| build_time_var(key).map(str::to_owned)))
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup("AUTH_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = normalize_base_url(&raw_base)?;

        let token_storage_key = lookup("AUTH_TOKEN_STORAGE_KEY")
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_STORAGE_KEY.to_owned());

        let request_timeout = match lookup("AUTH_REQUEST_TIMEOUT_SECS") {
            None => Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            Some(raw) => parse_timeout(&raw)?,
        };

        Ok(Self { api_base_url, token_storage_key, request_timeout })
    }

    /// Join the base address with a relative endpoint path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let valid = trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.starts_with('/');
    if !valid {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_owned()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn build_time_var(key: &str) -> Option<&'static str> {
    match key {
        "AUTH_API_BASE_URL" => option_env!("AUTH_API_BASE_URL"),
        "AUTH_TOKEN_STORAGE_KEY" => option_env!("AUTH_TOKEN_STORAGE_KEY"),
        "AUTH_REQUEST_TIMEOUT_SECS" => option_env!("AUTH_REQUEST_TIMEOUT_SECS"),
        _ => None,
    }
}
