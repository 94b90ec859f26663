use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A post as it comes off a subreddit listing, before any shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub score: i64,
    pub num_comments: u64,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub stickied: bool,
}

/// A comment attached to a daily discussion thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadComment {
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
    pub permalink: String,
}

/// A shaped post as stored in the hot-posts snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub reddit_id: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub subreddit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_comments: Vec<ThreadComment>,
}

/// The JSON document written under the hot-posts cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub posts: Vec<PostRecord>,
    /// Daily discussion threads, kept apart from the ranked posts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily_threads: Vec<PostRecord>,
    pub last_updated: String,
    pub total_posts: usize,
}

/// One row inserted into the sentiment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub symbol: String,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub mention_count: i64,
    pub source: String,
    pub timestamp: String,
    pub raw_data: Value,
}

/// The subset of a stored sentiment row that read queries select back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRow {
    pub symbol: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub mention_count: i64,
    pub timestamp: String,
}
