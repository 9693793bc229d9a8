// src/models/mod.rs

//! Domain models for the watcher application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod item;
mod rules;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, LoggingConfig, NotifierConfig, STORE_URL_ENV, ScheduleConfig,
    StoreBackend, StoreConfig, TRANSLATOR_KEY_ENV, TranslatorConfig, WEBHOOK_ENV,
};
pub use item::{ExtractedItem, Extraction};
pub use rules::{
    DateLocator, ElementQuery, ParseRules, RuleSet, SiteConfig, TitleLocator, split_alternatives,
};
