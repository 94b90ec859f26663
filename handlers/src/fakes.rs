//! In-memory stand-ins for the external services.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use stonks_core::{
    CoreError, DatabaseError, PostSource, RedditApiError, RedditPost, SentimentApiError,
    SentimentRecord, SentimentRow, SentimentSource, SentimentStore, SnapshotCache,
};

pub fn post(id: &str, title: &str, score: i64, stickied: bool) -> RedditPost {
    RedditPost {
        id: id.to_string(),
        title: title.to_string(),
        author: Some(format!("{id}_author")),
        score,
        num_comments: 10,
        url: format!("https://i.redd.it/{id}.png"),
        permalink: format!("/r/wallstreetbets/comments/{id}/slug/"),
        created_utc: 1_700_000_000.0,
        stickied,
    }
}

pub struct FakePostSource {
    pub posts: Vec<RedditPost>,
    pub fail: bool,
    pub requests: Mutex<Vec<(String, u32)>>,
}

impl FakePostSource {
    pub fn with_posts(posts: Vec<RedditPost>) -> Self {
        Self {
            posts,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_posts(Vec::new())
        }
    }
}

impl PostSource for FakePostSource {
    async fn hot_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<RedditPost>, CoreError> {
        self.requests
            .lock()
            .unwrap()
            .push((subreddit.to_string(), limit));
        if self.fail {
            return Err(RedditApiError::AuthenticationFailed {
                reason: "invalid_client".to_string(),
            }
            .into());
        }
        Ok(self.posts.clone())
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub fail: bool,
    pub writes: Mutex<Vec<(String, String, u64)>>,
    pub entries: Mutex<HashMap<String, String>>,
}

impl FakeCache {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn seeded(pairs: &[(&str, &str)]) -> Self {
        let cache = Self::default();
        {
            let mut entries = cache.entries.lock().unwrap();
            for (key, value) in pairs {
                entries.insert(key.to_string(), value.to_string());
            }
        }
        cache
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn connection_refused() -> CoreError {
        redis::RedisError::from((redis::ErrorKind::IoError, "Connection refused")).into()
    }
}

impl SnapshotCache for FakeCache {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CoreError> {
        if self.fail {
            return Err(Self::connection_refused());
        }
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string(), ttl_secs));
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        if self.fail {
            return Err(Self::connection_refused());
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }
}

pub enum SourceBehavior {
    Items(Vec<Value>),
    Status(u16),
}

pub struct FakeSentimentSource {
    pub behavior: SourceBehavior,
}

impl SentimentSource for FakeSentimentSource {
    async fn fetch_sentiment(&self) -> Result<Vec<Value>, CoreError> {
        match &self.behavior {
            SourceBehavior::Items(items) => Ok(items.clone()),
            SourceBehavior::Status(status_code) => Err(SentimentApiError::UnexpectedStatus {
                status_code: *status_code,
            }
            .into()),
        }
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub fail: bool,
    pub rows: Vec<SentimentRow>,
    pub inserts: Mutex<Vec<Vec<SentimentRecord>>>,
    pub queries: Mutex<Vec<(DateTime<Utc>, u32)>>,
}

impl FakeStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }

    fn rejected() -> CoreError {
        DatabaseError::InsertFailed {
            table: "reddit_sentiment".to_string(),
            status_code: 400,
            message: "column \"raw_data\" does not exist".to_string(),
        }
        .into()
    }
}

impl SentimentStore for FakeStore {
    async fn insert_sentiment(&self, records: &[SentimentRecord]) -> Result<(), CoreError> {
        if self.fail {
            return Err(Self::rejected());
        }
        self.inserts.lock().unwrap().push(records.to_vec());
        Ok(())
    }

    async fn recent_sentiment(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SentimentRow>, CoreError> {
        self.queries.lock().unwrap().push((since, limit));
        if self.fail {
            return Err(DatabaseError::QueryFailed {
                table: "reddit_sentiment".to_string(),
                status_code: 503,
                message: "upstream unavailable".to_string(),
            }
            .into());
        }
        Ok(self.rows.clone())
    }
}
