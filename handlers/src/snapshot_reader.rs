//! Serves the cached hot-posts snapshot as a ranked feed.

use crate::response::{report, HandlerResponse};
use crate::snapshot_fetcher::{HOT_POSTS_KEY, LAST_UPDATED_KEY};
use cache::decode_json;
use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use serde_json::json;
use stonks_core::{CacheEntry, CoreError, PostRecord, SnapshotCache, ThreadComment};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flair {
    Viral,
    Hot,
    Popular,
    New,
    Daily,
}

impl Flair {
    pub fn for_score(score: i64) -> Self {
        match score {
            s if s > 5000 => Flair::Viral,
            s if s > 2000 => Flair::Hot,
            s if s > 1000 => Flair::Popular,
            _ => Flair::New,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: String,
    pub title: String,
    pub author: String,
    pub created_at: String,
    pub flair: Flair,
    pub score: i64,
    pub comments: u64,
    /// Position in the cached listing, before the score sort.
    pub rank: usize,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub sentiment: &'static str,
    /// Only set on daily threads.
    #[serde(rename = "top_comments", skip_serializing_if = "Option::is_none")]
    pub top_comments: Option<Vec<ThreadComment>>,
}

/// Ranked posts plus the daily threads, each ranked by cached position.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub posts: Vec<FeedPost>,
    pub daily_threads: Vec<FeedPost>,
}

fn created_at(created_utc: f64) -> String {
    DateTime::from_timestamp_millis((created_utc * 1000.0) as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn feed_post(rank: usize, post: PostRecord, flair: Flair) -> FeedPost {
    let external_url = (post.url != post.permalink).then(|| post.url.clone());
    let top_comments = (flair == Flair::Daily).then_some(post.top_comments);
    FeedPost {
        id: post.reddit_id,
        title: post.title,
        author: post.author,
        created_at: created_at(post.created_utc),
        flair,
        score: post.score,
        comments: post.num_comments,
        rank,
        url: post.permalink,
        external_url,
        sentiment: "neutral",
        top_comments,
    }
}

/// Ranks posts by cached position, then orders them by score, highest first.
/// Daily threads keep their cached order.
pub fn build_feed(entry: CacheEntry) -> Feed {
    let mut posts: Vec<FeedPost> = entry
        .posts
        .into_iter()
        .enumerate()
        .map(|(index, post)| {
            let flair = Flair::for_score(post.score);
            feed_post(index + 1, post, flair)
        })
        .collect();
    posts.sort_by(|a, b| b.score.cmp(&a.score));

    let daily_threads = entry
        .daily_threads
        .into_iter()
        .enumerate()
        .map(|(index, thread)| feed_post(index + 1, thread, Flair::Daily))
        .collect();

    Feed {
        posts,
        daily_threads,
    }
}

pub async fn read_snapshot<C: SnapshotCache>(
    cache: &C,
) -> Result<Option<(CacheEntry, Option<String>)>, CoreError> {
    let Some(raw) = cache.get(HOT_POSTS_KEY).await? else {
        return Ok(None);
    };
    let entry: CacheEntry = decode_json(HOT_POSTS_KEY, &raw)?;
    let last_updated = cache.get(LAST_UPDATED_KEY).await?;
    Ok(Some((entry, last_updated)))
}

pub fn failure_response(err: &CoreError) -> HandlerResponse {
    report(err);
    HandlerResponse::failure(500, "Failed to fetch posts", Some(err.to_string()))
}

pub async fn wsb_posts<C: SnapshotCache>(cache: &C) -> HandlerResponse {
    match read_snapshot(cache).await {
        Ok(Some((entry, last_updated))) => {
            let last_updated = last_updated.unwrap_or_else(|| entry.last_updated.clone());
            let feed = build_feed(entry);
            info!(
                "Serving {} cached posts and {} daily threads",
                feed.posts.len(),
                feed.daily_threads.len()
            );
            HandlerResponse::ok(json!({
                "success": true,
                "total_posts": feed.posts.len(),
                "last_updated": last_updated,
                "posts": feed.posts,
                "daily_threads": feed.daily_threads,
            }))
        }
        Ok(None) => {
            warn!("No snapshot under {}", HOT_POSTS_KEY);
            HandlerResponse::failure(
                404,
                "No cached data available",
                Some("Trigger a cache refresh first with fetch-reddit-cache".to_string()),
            )
        }
        Err(err) => failure_response(&err),
    }
}
