// src/pipeline/watch.rs

//! One tick over all configured sites.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, ExtractedItem, Extraction, RuleSet};
use crate::services::{ChangeDetector, Extractor, Notifier, Translator, translate_or_original};
use crate::storage::FingerprintStore;
use crate::utils::Fetcher;

/// What happened to a site during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    /// A new item was sent.
    Notified(ExtractedItem),
    /// The newest item was already notified.
    Unchanged,
    /// The newest item predates the cutoff.
    Stale,
}

/// Summary of a tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub site_total: usize,
    pub notified: usize,
    pub unchanged: usize,
    pub stale: usize,
    pub failures: usize,
}

/// Fetch a site and run its rules, without notifying or storing anything.
pub async fn check_site(
    fetcher: &dyn Fetcher,
    extractor: &Extractor,
    site: &RuleSet,
    timeout: Duration,
) -> Result<Extraction> {
    let markup = fetcher.fetch(&site.base_url, timeout).await?;
    Ok(extractor.extract_markup(&markup, site)?)
}

/// Runs the fetch -> extract -> detect -> translate -> notify -> persist
/// chain for every site.
pub struct Watcher {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Extractor,
    detector: ChangeDetector,
    notifier: Arc<dyn Notifier>,
    translator: Option<Arc<dyn Translator>>,
}

impl Watcher {
    pub fn new(
        config: Arc<Config>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn FingerprintStore>,
        notifier: Arc<dyn Notifier>,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        let extractor = Extractor::new(config.cutoff_time());
        Self {
            config,
            fetcher,
            extractor,
            detector: ChangeDetector::new(store),
            notifier,
            translator,
        }
    }

    /// Process every configured site once.
    ///
    /// A failing site is logged and counted; it never stops the others.
    pub async fn run_once(&self) -> TickSummary {
        let concurrency = self.config.crawler.max_concurrent.max(1);
        let mut summary = TickSummary {
            site_total: self.config.sites.len(),
            ..TickSummary::default()
        };

        let mut results = stream::iter(&self.config.sites)
            .map(|site| async move { (site, self.process_site(site).await) })
            .buffer_unordered(concurrency);

        while let Some((site, result)) = results.next().await {
            match result {
                Ok(SiteOutcome::Notified(item)) => {
                    summary.notified += 1;
                    log::info!("[{}] notified: {} ({})", site.name, item.title, item.endpoint);
                }
                Ok(SiteOutcome::Unchanged) => {
                    summary.unchanged += 1;
                    log::info!("[{}] skipped, already notified", site.name);
                }
                Ok(SiteOutcome::Stale) => {
                    summary.stale += 1;
                    log::debug!("[{}] nothing new before cutoff", site.name);
                }
                Err(e) => {
                    summary.failures += 1;
                    log::warn!("[{}] failed for {}: {}", site.name, site.base_url, e);
                }
            }
        }

        log::info!(
            "Tick complete: {} sites, {} notified, {} unchanged, {} stale, {} failed",
            summary.site_total,
            summary.notified,
            summary.unchanged,
            summary.stale,
            summary.failures
        );
        summary
    }

    /// Run the full chain for one site.
    pub async fn process_site(&self, site: &RuleSet) -> Result<SiteOutcome> {
        let timeout = Duration::from_secs(self.config.crawler.timeout_secs);
        let extraction = check_site(self.fetcher.as_ref(), &self.extractor, site, timeout).await?;
        let mut item = match extraction {
            Extraction::Item(item) => item,
            Extraction::Stale { .. } => return Ok(SiteOutcome::Stale),
        };

        if !self.detector.should_notify(&site.name, &item.endpoint).await {
            return Ok(SiteOutcome::Unchanged);
        }

        if let Some(translator) = &self.translator {
            item.title = translate_or_original(
                translator.as_ref(),
                &item.title,
                &self.config.translator.target_language,
            )
            .await;
        }

        let message = item.format(&self.config.notifier.template, &site.name);
        self.notifier.send(&message).await?;

        // The message is out; a failed write means it may be sent again.
        if let Err(e) = self.detector.record(&site.name, &item.endpoint).await {
            log::error!("[{}] failed to save fingerprint: {}", site.name, e);
        }

        Ok(SiteOutcome::Notified(item))
    }
}
