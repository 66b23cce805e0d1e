//! Webhook delivery channel
//!
//! Posts section alerts to a Discord-compatible webhook as an embed payload.
//! Discord answers 204 No Content on success, other endpoints answer 200;
//! anything else counts as a failed delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Channel, ChannelError, ChannelResult, DeliveryStatus};
use crate::notifications::SectionAlert;

/// Embed accent colors
const COLOR_OPEN: u32 = 0x2ECC71;
const COLOR_CLOSED: u32 = 0xE74C3C;

/// Webhook channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL endpoint
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retry attempts on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

impl WebhookConfig {
    /// Create a new webhook configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set max retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Webhook URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Webhook URL must start with http:// or https://".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Webhook notification channel
///
/// # Payload format
///
/// ```json
/// {
///   "embeds": [{
///     "title": "Section open: CS 4349.003",
///     "description": "CS 4349.003 12 / 30 Open",
///     "color": 3066993,
///     "fields": [
///       {"name": "Seats", "value": "12/30 enrolled", "inline": true},
///       {"name": "Checked (UTC)", "value": "2026-01-15T09:30:00+00:00", "inline": true}
///     ],
///     "footer": {"text": "seatwatch"}
///   }]
/// }
/// ```
pub struct WebhookChannel {
    config: WebhookConfig,
    client: Client,
}

impl WebhookChannel {
    /// Create a new webhook channel
    pub fn new(config: WebhookConfig) -> ChannelResult<Self> {
        config.validate().map_err(ChannelError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Create a webhook channel with just a URL
    pub fn from_url(url: impl Into<String>) -> ChannelResult<Self> {
        Self::new(WebhookConfig::new(url))
    }

    /// Get the webhook URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Build the embed payload for an alert
    fn build_payload(&self, alert: &SectionAlert) -> serde_json::Value {
        let (title, color) = if alert.is_open {
            (format!("Section open: {}", alert.label), COLOR_OPEN)
        } else {
            (format!("Section closed: {}", alert.label), COLOR_CLOSED)
        };

        let description = alert.snippet();
        serde_json::json!({
            "embeds": [{
                "title": title,
                "description": if description.is_empty() { "No extra info".to_string() } else { description },
                "color": color,
                "fields": [
                    {"name": "Seats", "value": alert.seats_summary(), "inline": true},
                    {"name": "Checked (UTC)", "value": alert.checked_at.to_rfc3339(), "inline": true},
                ],
                "footer": {"text": "seatwatch"},
            }]
        })
    }

    /// Post the payload, retrying with exponential backoff
    async fn post_with_retry(&self, payload: &serde_json::Value) -> ChannelResult<()> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    max = self.config.max_retries + 1,
                    "Retrying webhook delivery"
                );
            }

            match self.client.post(&self.config.url).json(payload).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::warn!(status, "Webhook endpoint rejected delivery");
                    last_error = Some(ChannelError::Rejected(status));
                    // Client errors won't improve on retry
                    if response.status().is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Webhook request failed");
                    last_error = Some(ChannelError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or(ChannelError::Rejected(0)))
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, alert: &SectionAlert) -> ChannelResult<DeliveryStatus> {
        let payload = self.build_payload(alert);

        match self.post_with_retry(&payload).await {
            Ok(()) => {
                tracing::info!(label = %alert.label, "Webhook alert delivered");
                Ok(DeliveryStatus::success(self.name()))
            }
            Err(e) => Ok(DeliveryStatus::failure(self.name(), e.to_string())),
        }
    }
}
