//! Outbound notifications
//!
//! Delivery is fire-and-forget: callers log failures and carry on.

use crate::error::{BotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Somewhere to send human-readable status messages
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, recipient: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Telegram Bot API notifier
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    bot_token: String,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http,
            bot_token,
            enabled: true,
        }
    }

    /// Notifier that only logs
    pub fn disabled() -> Self {
        Self {
            http: Client::new(),
            bot_token: String::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(&self, recipient: &str, text: &str) -> Result<()> {
        if !self.enabled {
            info!("[notify:{}] {}", recipient, text);
            return Ok(());
        }

        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, self.bot_token);
        let request = SendMessageRequest {
            chat_id: recipient,
            text,
            parse_mode: "HTML",
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Notify(format!("Telegram returned {}: {}", status, body)));
        }

        debug!("Sent notification to {}", recipient);
        Ok(())
    }
}
