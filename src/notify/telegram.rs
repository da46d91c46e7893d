use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Delivery, Notifier};
use crate::config::{TelegramSettings, USER_AGENT};

/// Telegram Bot API `sendMessage` sink. Without credentials every send is a no-op.
#[derive(Clone)]
pub struct TelegramNotifier {
    target: Option<TelegramSettings>,
    client: Client,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(settings: Option<TelegramSettings>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("building telegram http client")?;
        Ok(Self {
            target: settings,
            client,
        })
    }

    pub fn disabled() -> Result<Self> {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<Delivery> {
        let Some(t) = &self.target else {
            tracing::info!(target: "notify", "Telegram disabled (no TELEGRAM_TOKEN/TELEGRAM_CHAT_ID)");
            return Ok(Delivery::Disabled);
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            t.api_base.trim_end_matches('/'),
            t.token
        );
        let body = SendMessage {
            chat_id: &t.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: false,
        };

        let rsp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            // reqwest errors embed the URL, which carries the bot token
            .map_err(|e| anyhow!("telegram post failed: {}", e.without_url()))?;

        let status = rsp.status();
        let reply: Option<ApiReply> = rsp.json().await.ok();
        match reply {
            Some(r) if status.is_success() && r.ok => Ok(Delivery::Sent),
            Some(r) => Err(anyhow!(
                "telegram rejected message (HTTP {status}): {}",
                r.description.unwrap_or_default()
            )),
            None => Err(anyhow!("telegram returned HTTP {status} with unreadable body")),
        }
    }
}
