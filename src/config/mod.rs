//! Configuration management for seatwatch
//!
//! Everything the engine depends on — selectors, cooldown, webhook URL,
//! state file paths — is explicit configuration loaded from environment
//! variables or a TOML file, never ambient lookups inside the core. That
//! keeps the extraction and decision logic testable without environment
//! setup.

use anyhow::{Context, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parser::DEFAULT_ROW_SELECTOR;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Watcher configuration
    pub watcher: WatcherConfig,

    /// Alert delivery configuration
    pub delivery: DeliveryConfig,

    /// State file configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Watcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Structural query identifying result rows
    pub row_selector: String,

    /// Results URL template with a {query} placeholder
    pub results_url: String,

    /// Seconds between check cycles in watch mode
    pub check_interval_secs: u64,

    /// Page fetch timeout in seconds
    pub request_timeout_secs: u64,
}

/// Alert delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Webhook URL; alerts are log-only when unset
    pub webhook_url: Option<String>,

    /// Minutes before a still-open section may re-alert
    pub cooldown_minutes: i64,

    /// Webhook request timeout in seconds
    pub timeout_secs: u64,

    /// Webhook retry attempts on failure
    pub max_retries: u32,
}

/// State file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Notification state file (JSON map, label → entry)
    pub state_path: PathBuf,

    /// Subscriptions file (JSON map, label → subscriber ids)
    pub subscriptions_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let row_selector = std::env::var("SEATWATCH_ROW_SELECTOR")
            .unwrap_or_else(|_| String::from(DEFAULT_ROW_SELECTOR));

        let results_url = std::env::var("SEATWATCH_RESULTS_URL")
            .unwrap_or_else(|_| String::from("https://coursebook.utdallas.edu/search/{query}"));

        let check_interval_secs = std::env::var("SEATWATCH_CHECK_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);

        let request_timeout_secs = std::env::var("SEATWATCH_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(20);

        let webhook_url = std::env::var("SEATWATCH_WEBHOOK_URL")
            .or_else(|_| std::env::var("DISCORD_WEBHOOK_URL"))
            .ok();

        let cooldown_minutes = std::env::var("SEATWATCH_COOLDOWN_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);

        let state_path = std::env::var("SEATWATCH_STATE_PATH")
            .unwrap_or_else(|_| String::from("data/notified.json"))
            .into();

        let subscriptions_path = std::env::var("SEATWATCH_SUBSCRIPTIONS_PATH")
            .unwrap_or_else(|_| String::from("data/subscriptions.json"))
            .into();

        let log_level =
            std::env::var("SEATWATCH_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("SEATWATCH_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            watcher: WatcherConfig {
                row_selector,
                results_url,
                check_interval_secs,
                request_timeout_secs,
            },
            delivery: DeliveryConfig {
                webhook_url,
                cooldown_minutes,
                timeout_secs: 10,
                max_retries: 3,
            },
            storage: StorageConfig {
                state_path,
                subscriptions_path,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if Selector::parse(&self.watcher.row_selector).is_err() {
            anyhow::bail!(
                "row_selector is not a valid CSS selector: {}",
                self.watcher.row_selector
            );
        }

        if self.watcher.check_interval_secs == 0 {
            anyhow::bail!("check_interval_secs must be greater than 0");
        }

        if self.delivery.cooldown_minutes < 0 {
            anyhow::bail!("cooldown_minutes must not be negative");
        }

        if let Some(url) = &self.delivery.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("webhook_url must start with http:// or https://");
            }
        }

        Ok(())
    }

    /// Get page fetch timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.watcher.request_timeout_secs)
    }

    /// Get the interval between check cycles as Duration
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.watcher.check_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watcher: WatcherConfig {
                row_selector: String::from(DEFAULT_ROW_SELECTOR),
                results_url: String::from("https://coursebook.utdallas.edu/search/{query}"),
                check_interval_secs: 300,
                request_timeout_secs: 20,
            },
            delivery: DeliveryConfig {
                webhook_url: None,
                cooldown_minutes: 60,
                timeout_secs: 10,
                max_retries: 3,
            },
            storage: StorageConfig {
                state_path: PathBuf::from("data/notified.json"),
                subscriptions_path: PathBuf::from("data/subscriptions.json"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_row_selector() {
        let mut config = Config::default();
        config.watcher.row_selector = String::from(":::nope");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::default();
        config.watcher.check_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let mut config = Config::default();
        config.delivery.cooldown_minutes = -5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_webhook_url_scheme_checked() {
        let mut config = Config::default();
        config.delivery.webhook_url = Some(String::from("ftp://example.com"));
        assert!(config.validate().is_err());

        config.delivery.webhook_url = Some(String::from("https://discord.com/api/webhooks/x"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duration_conversions() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.check_interval(), Duration::from_secs(300));
    }
}
