// src/services/translator.rs

//! Headline translation.
//!
//! Translation is best effort: callers fall back to the original text on
//! any error, and the message carries no marker saying so.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::TranslatorConfig;

/// Translates short texts.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(AppError::config("translator.endpoint is empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::translate(format!("{status}: {body}")));
        }

        let parsed: TranslateResponse = response.json().await?;
        let translated = parsed.translated_text.trim();
        if translated.is_empty() {
            return Err(AppError::translate("empty translation"));
        }
        Ok(translated.to_string())
    }
}

/// Translate `text`, falling back to it unchanged on failure.
pub async fn translate_or_original(
    translator: &dyn Translator,
    text: &str,
    target_language: &str,
) -> String {
    match translator.translate(text, target_language).await {
        Ok(translated) => translated,
        Err(e) => {
            log::warn!("Translation failed, keeping original title '{text}': {e}");
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(&self, text: &str, _target: &str) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    struct Down;

    #[async_trait]
    impl Translator for Down {
        async fn translate(&self, _text: &str, _target: &str) -> Result<String> {
            Err(AppError::translate("service unavailable"))
        }
    }

    #[tokio::test]
    async fn test_translate_or_original_uses_translation() {
        assert_eq!(translate_or_original(&Upper, "hello", "en").await, "HELLO");
    }

    #[tokio::test]
    async fn test_translate_or_original_falls_back() {
        assert_eq!(translate_or_original(&Down, "hello", "en").await, "hello");
    }

    #[test]
    fn test_request_shape() {
        let request = TranslateRequest {
            q: "Hello",
            source: "auto",
            target: "zh",
            format: "text",
            api_key: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"q": "Hello", "source": "auto", "target": "zh", "format": "text"})
        );
    }

    #[test]
    fn test_response_shape() {
        let parsed: TranslateResponse =
            serde_json::from_str(r#"{"translatedText": "你好"}"#).unwrap();
        assert_eq!(parsed.translated_text, "你好");
    }

    #[test]
    fn test_new_requires_endpoint() {
        assert!(HttpTranslator::new(&TranslatorConfig::default()).is_err());
    }
}
