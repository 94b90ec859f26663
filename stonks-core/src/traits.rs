use crate::{CoreError, RedditPost, SentimentRecord, SentimentRow};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Something that can list a subreddit's hot posts.
pub trait PostSource {
    async fn hot_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<RedditPost>, CoreError>;
}

/// Key-value store with per-key expiry.
pub trait SnapshotCache {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
}

/// Upstream provider of per-ticker sentiment objects.
///
/// Objects are returned untouched so callers can keep the original payload.
pub trait SentimentSource {
    async fn fetch_sentiment(&self) -> Result<Vec<Value>, CoreError>;
}

pub trait SentimentStore {
    async fn insert_sentiment(&self, records: &[SentimentRecord]) -> Result<(), CoreError>;

    async fn recent_sentiment(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SentimentRow>, CoreError>;
}
