//! Redis fingerprint store.
//!
//! Each site's fingerprint is a plain string key (`SET site endpoint`, no
//! expiry), so several watcher processes can share one server.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::{AppError, Result};
use crate::storage::FingerprintStore;

/// Store backed by a Redis server.
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Connect to `url` and `PING` the server.
    ///
    /// Fails when the URL is invalid, the server is unreachable within
    /// `timeout`, or the ping is refused.
    pub async fn open(url: &str, timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::store(format!("invalid redis url: {e}")))?;

        let conn = bounded(timeout, "connect", ConnectionManager::new(client)).await?;
        let store = Self { conn, timeout };

        let mut conn = store.conn.clone();
        let ping = redis::cmd("PING");
        let pong: String = bounded(timeout, "PING", ping.query_async(&mut conn)).await?;
        log::info!("Connected to redis ({pong})");

        Ok(store)
    }
}

/// Run a redis call under `timeout`, mapping both failures to store errors.
async fn bounded<T, F>(timeout: Duration, what: &str, call: F) -> Result<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AppError::store(format!("redis {what} failed: {e}"))),
        Err(_) => Err(AppError::store(format!(
            "redis {what} timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}

#[async_trait]
impl FingerprintStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        bounded(self.timeout, "GET", conn.get(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        bounded(self.timeout, "SET", conn.set(key, value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_rejects_non_redis_url() {
        let err = RedisStore::open("http://localhost:6379", Duration::from_secs(1))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Store(ref m) if m.contains("invalid redis url")));
    }

    #[tokio::test]
    async fn test_open_fails_when_server_unreachable() {
        // Port 1 is reserved and never runs redis.
        let err = RedisStore::open("redis://127.0.0.1:1/", Duration::from_millis(500))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Store(_)));
    }
}
