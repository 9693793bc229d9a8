// src/error.rs

//! Unified error handling for the watcher application.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Extraction-stage failures.
///
/// Each one skips the affected site for the current tick. A date older than
/// the cutoff is not an error and never shows up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no content element matched {tag}[{attr}] in {alternatives:?}")]
    ContentNotFound {
        tag: String,
        attr: String,
        alternatives: Vec<String>,
    },

    #[error("date element not found")]
    DateElementNotFound,

    #[error("date element is empty")]
    DateEmpty,

    #[error("date '{raw}' matched none of the formats {formats:?}")]
    DateUnparseable { raw: String, formats: Vec<String> },

    #[error("title element not found")]
    TitleNotFound,

    #[error("link not found on title element")]
    LinkNotFound,

    #[error("invalid URL '{input}': {source}")]
    UrlParse {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Extraction failed for a page
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Fetching a page failed
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Webhook delivery failed
    #[error("Notify error: {0}")]
    Notify(String),

    /// Translation service failed
    #[error("Translate error: {0}")]
    Translate(String),

    /// Fingerprint store failed
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with the URL as context.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    pub fn translate(message: impl fmt::Display) -> Self {
        Self::Translate(message.to_string())
    }

    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }
}
