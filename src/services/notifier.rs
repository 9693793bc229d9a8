// src/services/notifier.rs

//! Outbound notifications.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;

/// Delivers a rendered message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Posts plain-text messages to a Lark/Feishu style incoming webhook.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    msg_type: &'static str,
    content: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    text: &'a str,
}

impl<'a> TextMessage<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            msg_type: "text",
            content: TextContent { text },
        }
    }
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let webhook_url = config.webhook_url.trim();
        if webhook_url.is_empty() {
            return Err(AppError::config(
                "notifier.webhook_url is empty (set it or NEWSWATCH_WEBHOOK_URL)",
            ));
        }
        url::Url::parse(webhook_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&TextMessage::new(message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AppError::notify(format!("webhook returned {status}: {body}")));
        }
        check_reply(&body)
    }
}

/// Reply body of a Lark/Feishu bot webhook.
///
/// Rejections come back as HTTP 200 with a non-zero code. Older bots use
/// `StatusCode`/`StatusMessage` instead of `code`/`msg`.
#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default, alias = "StatusCode")]
    code: i64,
    #[serde(default, alias = "StatusMessage")]
    msg: String,
}

/// Fail on a reply carrying a non-zero code. Bodies that are not a JSON
/// object are accepted as-is.
fn check_reply(body: &str) -> Result<()> {
    match serde_json::from_str::<WebhookReply>(body) {
        Ok(reply) if reply.code != 0 => Err(AppError::notify(format!(
            "webhook rejected message (code {}): {}",
            reply.code, reply.msg
        ))),
        _ => Ok(()),
    }
}
