//! # Configuration Module
//!
//! This module defines the client configuration: where the external API
//! lives, how long a request may take, which language notices use and how
//! catalog lists are paged.

use std::time::Duration;

use crate::errors::ConfigError;

// Constants for client configuration
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PAGE_SIZE: usize = 20;

// Environment variable names
pub const ENV_API_URL: &str = "ROASTERY_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "ROASTERY_API_TIMEOUT_SECS";
pub const ENV_LANGUAGE: &str = "ROASTERY_LANG";
pub const ENV_PAGE_SIZE: &str = "ROASTERY_PAGE_SIZE";
pub const ENV_LOG_FORMAT: &str = "ROASTERY_LOG_FORMAT";

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Settings for the external REST API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL, without trailing slash (e.g., "http://localhost:8000/api")
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Top-level configuration for the client and CLI
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// External API settings
    pub api: ApiConfig,
    /// Language code for notices (e.g., "en", "fr")
    pub language: String,
    /// Default page size for catalog lists
    pub page_size: usize,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables
    ///
    /// Missing variables keep their defaults; present but malformed ones are
    /// reported as [`ConfigError::InvalidValue`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let trimmed = url.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(invalid(ENV_API_URL, &url));
            }
            config.api.base_url = trimmed.to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.api.timeout_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(invalid(ENV_TIMEOUT_SECS, &raw)),
            };
        }

        if let Some(language) = lookup(ENV_LANGUAGE) {
            let trimmed = language.trim();
            if !trimmed.is_empty() {
                config.language = trimmed.to_lowercase();
            }
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(invalid(ENV_PAGE_SIZE, &raw)),
            };
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = match raw.trim().to_lowercase().as_str() {
                "" | "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(invalid(ENV_LOG_FORMAT, &raw)),
            };
        }

        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
