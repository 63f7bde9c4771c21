//! Application-level configuration loading: paging defaults and aggregate write policy.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAMIFY_BACK_CONFIG_PATH";

const DEFAULT_PAGE_LIMIT: u64 = 10;
const MAX_PAGE_LIMIT: u64 = 100;
const DEFAULT_HASH_LENGTH: usize = 32;
const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Page size bounds for game listings.
pub struct PaginationConfig {
    /// Page size used when the request does not specify one.
    pub default_limit: u64,
    /// Largest page size a request may ask for.
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Listing page bounds.
    pub pagination: PaginationConfig,
    /// Length of the random token stored in badge and mission hashes.
    pub hash_length: usize,
    /// How many times a game write is attempted when concurrent writers keep winning.
    pub max_write_attempts: u32,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        page_limit = app_config.pagination.default_limit,
                        max_write_attempts = app_config.max_write_attempts,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            hash_length: DEFAULT_HASH_LENGTH,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    pagination: RawPagination,
    hash_length: Option<usize>,
    max_write_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPagination {
    default_limit: Option<u64>,
    max_limit: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let max_limit = value
            .pagination
            .max_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(MAX_PAGE_LIMIT);
        let default_limit = value
            .pagination
            .default_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(max_limit);

        Self {
            pagination: PaginationConfig {
                default_limit,
                max_limit,
            },
            hash_length: value
                .hash_length
                .filter(|length| *length > 0)
                .unwrap_or(DEFAULT_HASH_LENGTH),
            max_write_attempts: value
                .max_write_attempts
                .unwrap_or(DEFAULT_MAX_WRITE_ATTEMPTS)
                .max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "pagination": { "default_limit": 25 } }"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.pagination.default_limit, 25);
        assert_eq!(config.pagination.max_limit, MAX_PAGE_LIMIT);
        assert_eq!(config.hash_length, DEFAULT_HASH_LENGTH);
        assert_eq!(config.max_write_attempts, DEFAULT_MAX_WRITE_ATTEMPTS);
    }

    #[test]
    fn nonsensical_values_are_clamped() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "pagination": { "default_limit": 500, "max_limit": 50 }, "hash_length": 0, "max_write_attempts": 0 }"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.pagination.default_limit, 50);
        assert_eq!(config.hash_length, DEFAULT_HASH_LENGTH);
        assert_eq!(config.max_write_attempts, 1);
    }
}
