//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::RuleSet;

/// Environment variable overriding `notifier.webhook_url`.
pub const WEBHOOK_ENV: &str = "NEWSWATCH_WEBHOOK_URL";

/// Environment variable overriding `translator.api_key`.
pub const TRANSLATOR_KEY_ENV: &str = "NEWSWATCH_TRANSLATOR_KEY";

/// Environment variable overriding `store.url`.
pub const STORE_URL_ENV: &str = "NEWSWATCH_STORE_URL";

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Tick interval
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Items published before this day are ignored
    #[serde(default = "defaults::cutoff")]
    pub cutoff: NaiveDate,

    /// Webhook settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Optional headline translation
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Fingerprint store backend and location
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Watched sites
    #[serde(default)]
    pub sites: Vec<RuleSet>,
}

impl Config {
    /// Load, apply environment overrides and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override secrets from the environment when set.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(WEBHOOK_ENV) {
            self.notifier.webhook_url = url;
        }
        if let Ok(key) = std::env::var(TRANSLATOR_KEY_ENV) {
            self.translator.api_key = Some(key);
        }
        if let Ok(url) = std::env::var(STORE_URL_ENV) {
            self.store.url = url;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.schedule.interval_secs == 0 {
            return Err(AppError::validation("schedule.interval_secs must be > 0"));
        }
        if self.translator.enabled && self.translator.endpoint.trim().is_empty() {
            return Err(AppError::validation(
                "translator.endpoint is required when the translator is enabled",
            ));
        }
        if self.store.backend == StoreBackend::Redis {
            if !cfg!(feature = "redis") {
                return Err(AppError::validation(
                    "store.backend = \"redis\" needs the `redis` feature",
                ));
            }
            if self.store.timeout_secs == 0 {
                return Err(AppError::validation("store.timeout_secs must be > 0"));
            }
        }
        if self.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        let mut names = HashSet::new();
        for site in &self.sites {
            if !names.insert(site.name.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate site name '{}'",
                    site.name
                )));
            }
        }
        Ok(())
    }

    /// The cutoff as a timestamp (midnight of the cutoff day).
    pub fn cutoff_time(&self) -> NaiveDateTime {
        self.cutoff.and_time(NaiveTime::MIN)
    }
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Page fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Sites processed at once within a tick; 1 keeps them sequential
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between ticks
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Webhook notifier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Incoming-webhook URL
    #[serde(default)]
    pub webhook_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::notify_timeout")]
    pub timeout_secs: u64,

    /// Message template, see [`crate::models::ExtractedItem::format`]
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: defaults::notify_timeout(),
            template: defaults::template(),
        }
    }
}

/// Translation service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Translate endpoint (LibreTranslate-compatible)
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Target language code
    #[serde(default = "defaults::target_language")]
    pub target_language: String,

    #[serde(default = "defaults::translate_timeout")]
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key: None,
            target_language: defaults::target_language(),
            timeout_secs: defaults::translate_timeout(),
        }
    }
}

/// Where fingerprints are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON file at `store.path`
    #[default]
    File,
    /// Redis server at `store.url` (requires the `redis` feature)
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// JSON file holding one fingerprint per site
    #[serde(default = "defaults::store_path")]
    pub path: String,

    /// Redis connection URL
    #[serde(default = "defaults::redis_url")]
    pub url: String,

    /// Connect and per-command timeout for networked backends
    #[serde(default = "defaults::store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: defaults::store_path(),
            url: defaults::redis_url(),
            timeout_secs: defaults::store_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use chrono::NaiveDate;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; newswatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        1
    }

    pub fn interval() -> u64 {
        120
    }

    pub fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 24).unwrap_or_default()
    }

    // Notifier defaults
    pub fn notify_timeout() -> u64 {
        10
    }
    pub fn template() -> String {
        "【{site}】\n\n📢 最新消息:\n➡️ {title}\n\n🔗 链接: {link}\n📅 日期: {date}".into()
    }

    // Translator defaults
    pub fn target_language() -> String {
        "zh".into()
    }
    pub fn translate_timeout() -> u64 {
        10
    }

    // Store defaults
    pub fn store_path() -> String {
        "data/fingerprints.json".into()
    }
    pub fn redis_url() -> String {
        "redis://127.0.0.1:6379/0".into()
    }
    pub fn store_timeout() -> u64 {
        5
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
