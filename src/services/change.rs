// src/services/change.rs

//! Change detection against the last notified endpoint.

use std::sync::Arc;

use crate::error::Result;
use crate::storage::FingerprintStore;

/// Decides whether an extracted endpoint is news for a site.
#[derive(Clone)]
pub struct ChangeDetector {
    store: Arc<dyn FingerprintStore>,
}

impl ChangeDetector {
    pub fn new(store: Arc<dyn FingerprintStore>) -> Self {
        Self { store }
    }

    /// `false` only when the stored fingerprint equals `endpoint`.
    ///
    /// A failed lookup counts as "no fingerprint": notifying twice is
    /// preferred over missing an item.
    pub async fn should_notify(&self, site: &str, endpoint: &str) -> bool {
        match self.store.get(site).await {
            Ok(Some(previous)) => previous != endpoint,
            Ok(None) => true,
            Err(e) => {
                log::warn!("[{site}] fingerprint lookup failed, treating as new: {e}");
                true
            }
        }
    }

    /// Persist `endpoint` as the site's fingerprint.
    pub async fn record(&self, site: &str, endpoint: &str) -> Result<()> {
        self.store.set(site, endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl FingerprintStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AppError::store("connection refused"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::store("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_no_prior_fingerprint_notifies() {
        let detector = ChangeDetector::new(Arc::new(MemoryStore::new()));
        assert!(detector.should_notify("site", "https://example.com/a").await);
    }

    #[tokio::test]
    async fn test_same_endpoint_after_record_is_skipped() {
        let detector = ChangeDetector::new(Arc::new(MemoryStore::new()));
        detector.record("site", "https://example.com/a").await.unwrap();

        assert!(!detector.should_notify("site", "https://example.com/a").await);
        assert!(detector.should_notify("site", "https://example.com/b").await);
        assert!(detector.should_notify("other", "https://example.com/a").await);
    }

    #[tokio::test]
    async fn test_lookup_failure_notifies() {
        let detector = ChangeDetector::new(Arc::new(BrokenStore));
        assert!(detector.should_notify("site", "https://example.com/a").await);
        assert!(detector.record("site", "https://example.com/a").await.is_err());
    }
}
