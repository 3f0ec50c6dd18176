//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS};
use crate::{CoreError, CoreResult};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(database_url: String, max_connections: u32) -> CoreResult<Self> {
        if database_url.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "database_url cannot be empty".into(),
            ));
        }
        if max_connections == 0 {
            return Err(CoreError::InvalidInput(
                "max_connections must be at least 1".into(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        })
    }

    /// Override how long a request waits for a pooled connection.
    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the database URL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the bundled SQLite file location.
pub fn database_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_DATABASE_URL.into())
}

/// Parse the connection pool size from an optional string value.
pub fn max_connections_from_env_value(value: Option<String>) -> CoreResult<u32> {
    match non_blank(value) {
        None => Ok(DEFAULT_MAX_CONNECTIONS),
        Some(v) => v.parse::<u32>().map_err(|_| {
            CoreError::InvalidInput(format!(
                "DATABASE_MAX_CONNECTIONS must be a positive integer, got {v:?}"
            ))
        }),
    }
}

/// Build a `CoreConfig` from raw environment values.
///
/// Callers read the environment once (for example in `main`) and pass the values here.
pub fn core_config_from_env_values(
    database_url: Option<String>,
    max_connections: Option<String>,
) -> CoreResult<CoreConfig> {
    CoreConfig::new(
        database_url_from_env_value(database_url),
        max_connections_from_env_value(max_connections)?,
    )
}
