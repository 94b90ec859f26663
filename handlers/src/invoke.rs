//! Environment-configured entry points, one per handler.
//!
//! Each builds its clients from the process environment and runs the
//! matching pipeline. Setup failures come back as the same structured 500
//! response the pipeline itself would produce.

use crate::response::HandlerResponse;
use crate::{sentiment_importer, snapshot_fetcher, snapshot_reader, trending};
use cache::RedisCache;
use database::Database;
use reddit_client::RedditClient;
use sentiment_client::SentimentClient;
use stonks_core::{
    CacheConfig, CoreError, DatabaseConfig, RedditConfig, DEFAULT_USER_AGENT,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

async fn run_fetch_reddit_cache() -> Result<HandlerResponse, CoreError> {
    let reddit = RedditClient::new(RedditConfig::from_env()?)?;
    info!("Reddit client ready");
    let cache = RedisCache::new(&CacheConfig::from_env()?)?;
    info!("Redis cache configured for {}", cache.redacted_url());
    Ok(snapshot_fetcher::fetch_reddit_cache(&reddit, &cache).await)
}

async fn run_reddit_sentiment() -> Result<HandlerResponse, CoreError> {
    let source = SentimentClient::new(DEFAULT_USER_AGENT)?;
    let store = Database::new(&DatabaseConfig::from_env()?)?;
    Ok(sentiment_importer::reddit_sentiment(&source, &store).await)
}

async fn run_wsb_posts() -> Result<HandlerResponse, CoreError> {
    let cache = RedisCache::new(&CacheConfig::from_env()?)?;
    Ok(snapshot_reader::wsb_posts(&cache).await)
}

async fn run_trending() -> Result<HandlerResponse, CoreError> {
    let store = Database::new(&DatabaseConfig::from_env()?)?;
    Ok(trending::trending(&store).await)
}

pub async fn fetch_reddit_cache_from_env() -> HandlerResponse {
    let span = info_span!("fetch_reddit_cache", invocation_id = %Uuid::new_v4());
    run_fetch_reddit_cache()
        .instrument(span)
        .await
        .unwrap_or_else(|e| snapshot_fetcher::failure_response(&e))
}

pub async fn reddit_sentiment_from_env() -> HandlerResponse {
    let span = info_span!("reddit_sentiment", invocation_id = %Uuid::new_v4());
    run_reddit_sentiment()
        .instrument(span)
        .await
        .unwrap_or_else(|e| sentiment_importer::failure_response(&e))
}

pub async fn wsb_posts_from_env() -> HandlerResponse {
    let span = info_span!("wsb_posts", invocation_id = %Uuid::new_v4());
    run_wsb_posts()
        .instrument(span)
        .await
        .unwrap_or_else(|e| snapshot_reader::failure_response(&e))
}

pub async fn trending_from_env() -> HandlerResponse {
    let span = info_span!("trending", invocation_id = %Uuid::new_v4());
    run_trending()
        .instrument(span)
        .await
        .unwrap_or_else(|e| trending::failure_response(&e))
}
