//! Imports the Tradestie WallStreetBets sentiment feed into the sentiment table.

use crate::response::{report, HandlerResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use stonks_core::{CoreError, SentimentRecord, SentimentSource, SentimentStore};
use tracing::{info, warn};

pub const SENTIMENT_SOURCE_LABEL: &str = "wallstreetbets";
pub const TOP_STOCKS_ECHOED: usize = 5;

/// Reshapes one feed object, or `None` if a required field is missing or mistyped.
pub fn transform_item(item: &Value, timestamp: &str) -> Option<SentimentRecord> {
    Some(SentimentRecord {
        symbol: item.get("ticker")?.as_str()?.to_string(),
        sentiment_score: item.get("sentiment_score")?.as_f64()?,
        sentiment_label: item.get("sentiment")?.as_str()?.to_string(),
        mention_count: item.get("no_of_comments")?.as_i64()?,
        source: SENTIMENT_SOURCE_LABEL.to_string(),
        timestamp: timestamp.to_string(),
        raw_data: item.clone(),
    })
}

pub fn transform_batch(items: &[Value], now: DateTime<Utc>) -> Vec<SentimentRecord> {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Micros, true);
    items
        .iter()
        .filter_map(|item| {
            let record = transform_item(item, &timestamp);
            if record.is_none() {
                warn!("Skipping malformed sentiment item: {}", item);
            }
            record
        })
        .collect()
}

/// Fetches, reshapes and inserts one batch, returning what was stored.
pub async fn import_sentiment<S, D>(
    source: &S,
    store: &D,
    now: DateTime<Utc>,
) -> Result<Vec<SentimentRecord>, CoreError>
where
    S: SentimentSource,
    D: SentimentStore,
{
    let items = source.fetch_sentiment().await?;
    let records = transform_batch(&items, now);
    info!(
        "Transformed {} of {} sentiment items",
        records.len(),
        items.len()
    );

    if records.is_empty() {
        warn!("Sentiment feed produced no usable records; skipping insert");
        return Ok(records);
    }

    store.insert_sentiment(&records).await?;
    info!("Inserted {} sentiment rows", records.len());
    Ok(records)
}

pub fn failure_response(err: &CoreError) -> HandlerResponse {
    report(err);
    HandlerResponse::server_error(err.to_string())
}

pub async fn reddit_sentiment_at<S, D>(source: &S, store: &D, now: DateTime<Utc>) -> HandlerResponse
where
    S: SentimentSource,
    D: SentimentStore,
{
    match import_sentiment(source, store, now).await {
        Ok(records) => {
            let top: Vec<&SentimentRecord> = records.iter().take(TOP_STOCKS_ECHOED).collect();
            HandlerResponse::ok(json!({
                "success": true,
                "processed_stocks": records.len(),
                "top_stocks": top,
            }))
        }
        Err(err) => failure_response(&err),
    }
}

pub async fn reddit_sentiment<S, D>(source: &S, store: &D) -> HandlerResponse
where
    S: SentimentSource,
    D: SentimentStore,
{
    reddit_sentiment_at(source, store, Utc::now()).await
}
