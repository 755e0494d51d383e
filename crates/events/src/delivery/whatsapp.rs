//! WhatsApp notifications through the CallMeBot HTTP API.
//!
//! Delivery is a GET with the recipient, message and API key as query
//! parameters. Failed attempts are retried with backoff (1 s, 2 s, 4 s).

use std::time::Duration;

/// Retry delays between attempts.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_CALLMEBOT_URL: &str = "https://api.callmebot.com/whatsapp.php";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("WhatsApp gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub api_key: String,
    /// Recipient number in international format without `+`.
    pub phone: String,
    pub api_url: String,
}

impl WhatsAppConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both the API key and the number are set, which
    /// disables notifications.
    ///
    /// | Variable            | Required | Default                                  |
    /// |---------------------|----------|------------------------------------------|
    /// | `CALLMEBOT_API_KEY` | yes      |                                          |
    /// | `WHATSAPP_NUMBER`   | yes      |                                          |
    /// | `CALLMEBOT_API_URL` | no       | `https://api.callmebot.com/whatsapp.php` |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("CALLMEBOT_API_KEY").ok().filter(|v| !v.is_empty())?;
        let phone = std::env::var("WHATSAPP_NUMBER").ok().filter(|v| !v.is_empty())?;
        Some(Self {
            api_key,
            phone: phone.trim_start_matches('+').to_string(),
            api_url: std::env::var("CALLMEBOT_API_URL")
                .unwrap_or_else(|_| DEFAULT_CALLMEBOT_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// WhatsAppDelivery
// ---------------------------------------------------------------------------

pub struct WhatsAppDelivery {
    client: reqwest::Client,
    config: WhatsAppConfig,
    retry_delays: Vec<Duration>,
}

impl WhatsAppDelivery {
    pub fn new(config: WhatsAppConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            retry_delays: RETRY_DELAYS.to_vec(),
        })
    }

    /// Override the backoff schedule.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// Send `text` to the configured number, retrying on failure.
    ///
    /// Makes one attempt per retry delay plus a final attempt.
    pub async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(text).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "WhatsApp delivery attempt failed, retrying");
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        self.try_send(text).await.inspect_err(|e| {
            tracing::error!(error = %e, "WhatsApp delivery failed after all retries");
        })
    }

    async fn try_send(&self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("phone", self.config.phone.as_str()),
                ("text", text),
                ("apikey", self.config.api_key.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}
