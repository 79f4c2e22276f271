//! Environment-driven runtime configuration.
//!
//! Every setting has a default that targets the local development auth
//! service, so an empty environment yields a usable [`AppConfig`].

use std::time::Duration;

use monotone_auth::{RetryPolicy, validate_base_url};
use monotone_capture::ChunkRetention;
use thiserror::Error;
use url::Url;

/// Auth service base URL.
pub const ENV_AUTH_BASE_URL: &str = "MONOTONE_AUTH_BASE_URL";
/// Per-request auth timeout in milliseconds.
pub const ENV_AUTH_TIMEOUT_MS: &str = "MONOTONE_AUTH_TIMEOUT_MS";
/// Retries after the first failed auth attempt.
pub const ENV_AUTH_MAX_RETRIES: &str = "MONOTONE_AUTH_MAX_RETRIES";
/// Session lifetime when the token response has no `expires_in`.
pub const ENV_SESSION_TTL_SECS: &str = "MONOTONE_SESSION_TTL_SECS";
/// `reset` or `accumulate`.
pub const ENV_CHUNK_RETENTION: &str = "MONOTONE_CHUNK_RETENTION";

/// Default auth service base URL (local development server).
pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:8000/";

const DEFAULT_AUTH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SESSION_TTL_SECS: u64 = 3_600;

/// Runtime configuration for the app controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Validated auth service base URL.
    pub auth_base_url: Url,
    /// Per-request auth timeout.
    pub auth_timeout: Duration,
    /// Retry policy for auth calls.
    pub retry: RetryPolicy,
    /// Fallback session lifetime in milliseconds.
    pub session_ttl_ms: u64,
    /// Chunk handling between recordings.
    pub chunk_retention: ChunkRetention,
}

impl AppConfig {
    /// Reads configuration from process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for any malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Unset or blank keys fall back to defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for any malformed value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        let auth_base_url = value(ENV_AUTH_BASE_URL)
            .unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.to_string());
        let auth_base_url = validate_base_url(auth_base_url.trim()).map_err(|error| {
            ConfigError::InvalidValue {
                key: ENV_AUTH_BASE_URL,
                reason: error.to_string(),
            }
        })?;

        let auth_timeout_ms =
            parse_u64(ENV_AUTH_TIMEOUT_MS, value(ENV_AUTH_TIMEOUT_MS), DEFAULT_AUTH_TIMEOUT_MS)?;
        if auth_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_AUTH_TIMEOUT_MS,
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        let defaults = RetryPolicy::default();
        let max_retries = parse_u64(
            ENV_AUTH_MAX_RETRIES,
            value(ENV_AUTH_MAX_RETRIES),
            u64::from(defaults.max_retries),
        )?;
        let max_retries = u32::try_from(max_retries).map_err(|_| ConfigError::InvalidValue {
            key: ENV_AUTH_MAX_RETRIES,
            reason: "retry count is too large".to_string(),
        })?;

        let session_ttl_secs = parse_u64(
            ENV_SESSION_TTL_SECS,
            value(ENV_SESSION_TTL_SECS),
            DEFAULT_SESSION_TTL_SECS,
        )?;

        let chunk_retention = match value(ENV_CHUNK_RETENTION) {
            Some(raw) => raw
                .parse::<ChunkRetention>()
                .map_err(|error| ConfigError::InvalidValue {
                    key: ENV_CHUNK_RETENTION,
                    reason: error.to_string(),
                })?,
            None => ChunkRetention::default(),
        };

        Ok(Self {
            auth_base_url,
            auth_timeout: Duration::from_millis(auth_timeout_ms),
            retry: RetryPolicy {
                max_retries,
                ..defaults
            },
            session_ttl_ms: session_ttl_secs.saturating_mul(1_000),
            chunk_retention,
        })
    }
}

fn parse_u64(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|error| ConfigError::InvalidValue {
                key,
                reason: format!("`{}` is not a non-negative integer: {error}", raw.trim()),
            }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("invalid {key}: {reason}")]
    InvalidValue {
        /// Offending variable name.
        key: &'static str,
        /// Human-readable cause.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config.auth_base_url.as_str(), DEFAULT_AUTH_BASE_URL);
        assert_eq!(config.auth_timeout, Duration::from_secs(10));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.session_ttl_ms, 3_600_000);
        assert_eq!(config.chunk_retention, ChunkRetention::ResetPerRecording);
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_AUTH_BASE_URL, "https://auth.example.test/api"),
            (ENV_AUTH_TIMEOUT_MS, "2500"),
            (ENV_AUTH_MAX_RETRIES, "0"),
            (ENV_SESSION_TTL_SECS, "60"),
            (ENV_CHUNK_RETENTION, "accumulate"),
        ]))
        .expect("overrides are valid");

        assert_eq!(config.auth_base_url.host_str(), Some("auth.example.test"));
        assert_eq!(config.auth_timeout, Duration::from_millis(2_500));
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.session_ttl_ms, 60_000);
        assert_eq!(config.chunk_retention, ChunkRetention::Accumulate);
    }

    #[test]
    fn rejects_malformed_values() {
        let error = AppConfig::from_lookup(lookup(&[(ENV_AUTH_TIMEOUT_MS, "soon")]))
            .expect_err("non-numeric timeout must fail");
        assert!(matches!(
            error,
            ConfigError::InvalidValue {
                key: ENV_AUTH_TIMEOUT_MS,
                ..
            }
        ));

        assert!(AppConfig::from_lookup(lookup(&[(ENV_AUTH_TIMEOUT_MS, "0")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[(ENV_AUTH_BASE_URL, "http://auth.example.test/")]))
                .is_err()
        );
        assert!(AppConfig::from_lookup(lookup(&[(ENV_CHUNK_RETENTION, "sometimes")])).is_err());
    }
}
