//! In-process collaborators for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{Notifier, Translator};
use crate::utils::Fetcher;

/// Serves canned pages by URL; unknown URLs fail like an HTTP 500.
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<String, String>>,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_page(self, url: &str, markup: &str) -> Self {
        self.set_page(url, markup);
        self
    }

    pub fn set_page(&self, url: &str, markup: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), markup.to_string());
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "HTTP 500 Internal Server Error"))
    }
}

/// Records every message; optionally refuses them all.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub attempts: AtomicUsize,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::notify("webhook returned 502"));
        }
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Prefixes text with the target language, or always fails.
pub struct TaggingTranslator {
    pub fail: bool,
}

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        if self.fail {
            return Err(AppError::translate("service unavailable"));
        }
        Ok(format!("[{target}] {text}"))
    }
}

/// Listing page with one item in a `div.item` block.
pub fn listing(title: &str, href: &str, date: &str) -> String {
    format!(
        r#"<html><body>
        <div class="item"><a href="{href}">{title}</a><time>{date}</time></div>
        </body></html>"#
    )
}

/// Config watching `https://a.example/news` and `https://b.example/news`.
pub fn two_site_config() -> Config {
    toml::from_str(
        r#"
        [crawler]
        max_concurrent = 2

        [notifier]
        template = "{site}|{title}|{link}|{date}"

        [[sites]]
        name = "A"
        base_url = "https://a.example/news"
        date_formats = ["2006-01-02"]

        [sites.rules]
        content = "item"
        date_tag = "time"

        [[sites]]
        name = "B"
        base_url = "https://b.example/news"
        date_formats = ["2006-01-02"]

        [sites.rules]
        content = "item"
        date_tag = "time"
        "#,
    )
    .unwrap()
}
