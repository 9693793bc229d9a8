//! Storage abstractions for site fingerprints.
//!
//! A fingerprint is the last endpoint notified for a site, keyed by site
//! name. Backends:
//!
//! - [`LocalStore`]: a JSON object on disk, rewritten atomically on every set
//! - `RedisStore`: one string key per site on a Redis server (feature `redis`)
//! - [`MemoryStore`]: process-local, for dry runs and tests

pub mod local;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{StoreBackend, StoreConfig};

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

/// Key-value store holding one fingerprint per site.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Stored value for `key`, `None` if the key was never set.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Open the configured backend. Any failure here should abort startup.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn FingerprintStore>> {
    match config.backend {
        StoreBackend::File => {
            let store = LocalStore::open(&config.path).await?;
            log::info!("Fingerprints stored at {}", store.path().display());
            Ok(Arc::new(store))
        }
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            let timeout = std::time::Duration::from_secs(config.timeout_secs);
            Ok(Arc::new(RedisStore::open(&config.url, timeout).await?))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => Err(crate::error::AppError::config(
            "store.backend = \"redis\" needs the `redis` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_store_file_backend() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = StoreConfig {
            path: tmp.path().join("fp.json").to_string_lossy().into_owned(),
            ..StoreConfig::default()
        };

        let store = open_store(&config).await.unwrap();
        store.set("site", "https://example.com/a").await.unwrap();
        assert!(tmp.path().join("fp.json").exists());
    }

    #[tokio::test]
    async fn test_open_store_redis_backend_fails_without_server() {
        let config = StoreConfig {
            backend: StoreBackend::Redis,
            url: "redis://127.0.0.1:1/".to_string(),
            timeout_secs: 1,
            ..StoreConfig::default()
        };
        assert!(open_store(&config).await.is_err());
    }
}
