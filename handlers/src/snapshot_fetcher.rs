//! Fetches r/wallstreetbets hot posts and writes them to the cache as one snapshot.

use crate::response::{report, HandlerResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use stonks_core::{
    CacheEntry, CoreError, PostRecord, PostSource, RedditPost, SnapshotCache,
};
use tracing::{debug, info, warn};

pub const SUBREDDIT: &str = "wallstreetbets";
pub const HOT_POST_LIMIT: u32 = 25;

pub const HOT_POSTS_KEY: &str = "wsb:hot_posts";
pub const LAST_UPDATED_KEY: &str = "wsb:last_updated";
pub const SNAPSHOT_TTL_SECS: u64 = 900;

pub const MAX_TITLE_CHARS: usize = 500;
pub const SAMPLE_TITLE_CHARS: usize = 100;
pub const SAMPLE_TITLE_COUNT: usize = 3;

const PERMALINK_HOST: &str = "https://reddit.com";
const DELETED_AUTHOR: &str = "[deleted]";

/// Outcome of a run that reached the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub posts_processed: usize,
    pub cached_until: f64,
    pub sample_titles: Vec<String>,
}

/// Cuts `text` to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

pub fn shape_post(post: RedditPost) -> PostRecord {
    PostRecord {
        reddit_id: post.id,
        title: truncate_chars(&post.title, MAX_TITLE_CHARS),
        author: post.author.unwrap_or_else(|| DELETED_AUTHOR.to_string()),
        score: post.score,
        num_comments: post.num_comments,
        url: post.url,
        permalink: format!("{}{}", PERMALINK_HOST, post.permalink),
        created_utc: post.created_utc,
        subreddit: SUBREDDIT.to_string(),
        top_comments: Vec::new(),
    }
}

/// Drops stickied posts and shapes the rest, keeping listing order.
pub fn shape_batch(posts: Vec<RedditPost>) -> Vec<PostRecord> {
    posts
        .into_iter()
        .filter(|post| {
            if post.stickied {
                debug!("Skipping stickied post {}", post.id);
            }
            !post.stickied
        })
        .map(|post| {
            let record = shape_post(post);
            debug!(
                "Prepared: {}... (score: {})",
                truncate_chars(&record.title, 50),
                record.score
            );
            record
        })
        .collect()
}

/// Fetches, shapes and caches one snapshot.
///
/// Returns `Ok(None)` when nothing survived filtering; the cache is not
/// touched in that case so a still-valid snapshot keeps serving.
pub async fn refresh_snapshot<S, C>(
    source: &S,
    cache: &C,
    now: DateTime<Utc>,
) -> Result<Option<SnapshotSummary>, CoreError>
where
    S: PostSource,
    C: SnapshotCache,
{
    let listing = source.hot_posts(SUBREDDIT, HOT_POST_LIMIT).await?;
    let fetched = listing.len();
    let posts = shape_batch(listing);
    info!(
        "Shaped {} of {} hot posts from r/{}",
        posts.len(),
        fetched,
        SUBREDDIT
    );

    if posts.is_empty() {
        warn!("No posts left after filtering; leaving cache untouched");
        return Ok(None);
    }

    let last_updated = now.to_rfc3339_opts(SecondsFormat::Micros, true);
    let sample_titles = posts
        .iter()
        .take(SAMPLE_TITLE_COUNT)
        .map(|post| truncate_chars(&post.title, SAMPLE_TITLE_CHARS))
        .collect();

    let entry = CacheEntry {
        total_posts: posts.len(),
        posts,
        daily_threads: Vec::new(),
        last_updated: last_updated.clone(),
    };
    let payload = serde_json::to_string(&entry)?;

    cache
        .set_ex(HOT_POSTS_KEY, &payload, SNAPSHOT_TTL_SECS)
        .await?;
    cache
        .set_ex(LAST_UPDATED_KEY, &last_updated, SNAPSHOT_TTL_SECS)
        .await?;

    info!(
        "Cached {} posts under {} for {}s",
        entry.total_posts, HOT_POSTS_KEY, SNAPSHOT_TTL_SECS
    );

    Ok(Some(SnapshotSummary {
        posts_processed: entry.total_posts,
        cached_until: now.timestamp_millis() as f64 / 1000.0 + SNAPSHOT_TTL_SECS as f64,
        sample_titles,
    }))
}

pub fn failure_response(err: &CoreError) -> HandlerResponse {
    report(err);
    let message = match err {
        CoreError::Cache(cache_err) => format!("Redis connection failed: {}", cache_err),
        other => other.to_string(),
    };
    HandlerResponse::server_error(message)
}

pub async fn fetch_reddit_cache_at<S, C>(source: &S, cache: &C, now: DateTime<Utc>) -> HandlerResponse
where
    S: PostSource,
    C: SnapshotCache,
{
    match refresh_snapshot(source, cache, now).await {
        Ok(Some(summary)) => HandlerResponse::ok(json!({
            "success": true,
            "posts_processed": summary.posts_processed,
            "cached_until": summary.cached_until,
            "sample_titles": summary.sample_titles,
            "message": format!(
                "Successfully fetched and cached {} WSB posts",
                summary.posts_processed
            ),
            "cache_key": HOT_POSTS_KEY,
        })),
        Ok(None) => HandlerResponse::ok(json!({
            "success": true,
            "message": "No new posts to process",
            "posts_processed": 0,
        })),
        Err(err) => failure_response(&err),
    }
}

pub async fn fetch_reddit_cache<S, C>(source: &S, cache: &C) -> HandlerResponse
where
    S: PostSource,
    C: SnapshotCache,
{
    fetch_reddit_cache_at(source, cache, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{post, FakeCache, FakePostSource};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        let rockets = "🚀".repeat(600);
        let cut = truncate_chars(&rockets, MAX_TITLE_CHARS);
        assert_eq!(cut.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_shape_post_fills_defaults() {
        let mut raw = post("abc", "Title", 7, false);
        raw.author = None;

        let record = shape_post(raw);
        assert_eq!(record.reddit_id, "abc");
        assert_eq!(record.author, "[deleted]");
        assert_eq!(
            record.permalink,
            "https://reddit.com/r/wallstreetbets/comments/abc/slug/"
        );
        assert_eq!(record.subreddit, "wallstreetbets");
    }

    #[tokio::test]
    async fn test_stickied_posts_never_reach_the_cache() {
        let source = FakePostSource::with_posts(vec![
            post("rules", "Read the rules", 1, true),
            post("a1", "YOLO on calls", 900, false),
            post("daily", "Daily Discussion", 50, true),
            post("a2", "Loss porn", 300, false),
        ]);
        let cache = FakeCache::default();

        let response = fetch_reddit_cache_at(&source, &cache, fixed_now()).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["posts_processed"], 2);

        let writes = cache.writes.lock().unwrap();
        let entry: CacheEntry = serde_json::from_str(&writes[0].1).unwrap();
        let ids: Vec<&str> = entry.posts.iter().map(|p| p.reddit_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(entry.total_posts, 2);
    }

    #[tokio::test]
    async fn test_snapshot_written_under_both_keys_with_fixed_ttl() {
        let source = FakePostSource::with_posts(vec![
            post("a1", "one", 1, false),
            post("a2", "two", 2, false),
            post("a3", "three", 3, false),
        ]);
        let cache = FakeCache::default();

        let response = fetch_reddit_cache_at(&source, &cache, fixed_now()).await;
        assert!(response.is_success());
        assert_eq!(response.body["cache_key"], HOT_POSTS_KEY);

        let writes = cache.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, HOT_POSTS_KEY);
        assert_eq!(writes[1].0, LAST_UPDATED_KEY);
        assert!(writes.iter().all(|(_, _, ttl)| *ttl == 900));

        let written: serde_json::Value = serde_json::from_str(&writes[0].1).unwrap();
        assert!(written.get("daily_threads").is_none());
        assert!(written["posts"][0].get("top_comments").is_none());

        let entry: CacheEntry = serde_json::from_str(&writes[0].1).unwrap();
        assert_eq!(entry.posts.len(), 3);
        assert_eq!(entry.last_updated, writes[1].1);
        assert_eq!(entry.last_updated, "2024-03-01T15:30:00.000000Z");

        let requests = source.requests.lock().unwrap();
        assert_eq!(requests[0], ("wallstreetbets".to_string(), 25));
    }

    #[tokio::test]
    async fn test_response_reports_expiry_and_samples() {
        let long_title = "x".repeat(700);
        let source = FakePostSource::with_posts(vec![
            post("a1", &long_title, 1, false),
            post("a2", "two", 2, false),
            post("a3", "three", 3, false),
            post("a4", "four", 4, false),
        ]);
        let cache = FakeCache::default();

        let now = fixed_now();
        let response = fetch_reddit_cache_at(&source, &cache, now).await;

        let cached_until = response.body["cached_until"].as_f64().unwrap();
        assert_eq!(cached_until, now.timestamp() as f64 + 900.0);

        let samples = response.body["sample_titles"].as_array().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].as_str().unwrap().chars().count(), 100);
        assert_eq!(samples[2], "three");

        let writes = cache.writes.lock().unwrap();
        let entry: CacheEntry = serde_json::from_str(&writes[0].1).unwrap();
        assert_eq!(entry.posts[0].title.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_cache_write() {
        let source = FakePostSource::with_posts(vec![post("rules", "Rules", 1, true)]);
        let cache = FakeCache::seeded(&[(HOT_POSTS_KEY, "previous snapshot")]);

        let response = fetch_reddit_cache_at(&source, &cache, fixed_now()).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body["success"], true);
        assert_eq!(response.body["posts_processed"], 0);
        assert_eq!(cache.write_count(), 0);
        assert_eq!(
            cache.entries.lock().unwrap().get(HOT_POSTS_KEY).unwrap(),
            "previous snapshot"
        );
    }

    #[tokio::test]
    async fn test_cache_failure_has_distinct_prefix() {
        let source = FakePostSource::with_posts(vec![post("a1", "one", 1, false)]);
        let cache = FakeCache::failing();

        let response = fetch_reddit_cache_at(&source, &cache, fixed_now()).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body["success"], false);
        let error = response.body["error"].as_str().unwrap();
        assert!(error.starts_with("Redis connection failed: "));
        assert!(error.contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_source_failure_is_generic_error() {
        let source = FakePostSource::failing();
        let cache = FakeCache::default();

        let response = fetch_reddit_cache_at(&source, &cache, fixed_now()).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body["success"], false);
        let error = response.body["error"].as_str().unwrap();
        assert!(!error.starts_with("Redis connection failed"));
        assert!(error.contains("invalid_client"));
        assert_eq!(cache.write_count(), 0);
    }
}
