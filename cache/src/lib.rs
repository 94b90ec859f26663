//! Redis access for the hot-posts snapshot.

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use std::fmt;
use stonks_core::{CacheConfig, CacheError, CoreError, SnapshotCache};
use tracing::{debug, error, info};
use url::Url;

#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
    redacted_url: String,
}

// Manual Debug so the connection password never reaches the logs.
impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("redis_url", &self.redacted_url)
            .finish()
    }
}

impl RedisCache {
    /// Parses the connection URL. No connection is made until the first command.
    pub fn new(config: &CacheConfig) -> Result<Self, CoreError> {
        let redacted_url = redact_url(&config.redis_url);
        info!("Initializing Redis client for {}", redacted_url);

        let client = redis::Client::open(config.redis_url.as_str()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            CacheError::Redis(e)
        })?;

        Ok(Self {
            client,
            redacted_url,
        })
    }

    pub fn redacted_url(&self) -> &str {
        &self.redacted_url
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!("Redis connection to {} failed: {}", self.redacted_url, e);
                CacheError::Redis(e)
            })
    }

    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| {
                error!("Redis SETEX error for key {}: {}", key, e);
                CacheError::Redis(e)
            })?;
        debug!("SETEX {} ({} bytes, ttl {}s)", key, value.len(), ttl_secs);
        Ok(())
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            error!("Redis GET error for key {}: {}", key, e);
            CacheError::Redis(e)
        })?;
        match &value {
            Some(_) => debug!("Cache HIT for key: {}", key),
            None => debug!("Cache MISS for key: {}", key),
        }
        Ok(value)
    }
}

impl SnapshotCache for RedisCache {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CoreError> {
        Ok(self.set_with_expiry(key, value, ttl_secs).await?)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.get_string(key).await?)
    }
}

/// Deserializes a cached JSON document, tagging failures with the key.
pub fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, CacheError> {
    serde_json::from_str(raw).map_err(|e| CacheError::CorruptEntry {
        key: key.to_string(),
        details: e.to_string(),
    })
}

fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable redis url>".to_string(),
    }
}
