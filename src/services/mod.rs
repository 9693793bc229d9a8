//! Service layer for the watcher application.
//!
//! This module contains the business logic for:
//! - Item extraction from fetched pages (`Extractor`)
//! - Date layout parsing (`DateLayout`)
//! - Change detection against stored fingerprints (`ChangeDetector`)
//! - Headline translation (`Translator`)
//! - Webhook delivery (`Notifier`)

mod change;
pub mod dates;
pub mod extractor;
mod notifier;
mod translator;

pub use change::ChangeDetector;
pub use dates::DateLayout;
pub use extractor::Extractor;
pub use notifier::{Notifier, WebhookNotifier};
pub use translator::{HttpTranslator, Translator, translate_or_original};
