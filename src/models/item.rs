//! Extracted item data structure.

use chrono::NaiveDateTime;
use serde::Serialize;

/// The newest item found on a site's page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractedItem {
    /// Headline, translated when a translator is configured
    pub title: String,

    /// Absolute URL of the item; also the site's fingerprint
    pub endpoint: String,

    /// Publication timestamp
    pub published_at: NaiveDateTime,
}

/// Outcome of running a rule set over a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A fresh item.
    Item(ExtractedItem),
    /// The newest item predates the cutoff; nothing to report.
    Stale { published_at: NaiveDateTime },
}

impl ExtractedItem {
    /// Format the item for a notification using a template.
    ///
    /// Supported placeholders: `{site}`, `{title}`, `{link}`, `{date}`
    /// (as `YYYY-MM-DD`).
    pub fn format(&self, template: &str, site: &str) -> String {
        template
            .replace("{site}", site)
            .replace("{title}", &self.title)
            .replace("{link}", &self.endpoint)
            .replace("{date}", &self.published_at.format("%Y-%m-%d").to_string())
    }
}
