//! Lists the most discussed tickers from the last day of sentiment rows.

use crate::response::{report, HandlerResponse};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use stonks_core::{CoreError, SentimentRow, SentimentStore};
use tracing::info;

pub const TRENDING_WINDOW_HOURS: i64 = 24;
pub const TRENDING_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingStock {
    pub symbol: String,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub mentions: i64,
    pub trend: Trend,
    pub last_updated: String,
}

impl From<SentimentRow> for TrendingStock {
    fn from(row: SentimentRow) -> Self {
        let trend = if row.sentiment_score > 0.0 {
            Trend::Bullish
        } else {
            Trend::Bearish
        };
        Self {
            symbol: row.symbol,
            sentiment: row.sentiment_label,
            sentiment_score: row.sentiment_score,
            mentions: row.mention_count,
            trend,
            last_updated: row.timestamp,
        }
    }
}

pub async fn trending_at<D: SentimentStore>(store: &D, now: DateTime<Utc>) -> HandlerResponse {
    let since = now - Duration::hours(TRENDING_WINDOW_HOURS);
    match store.recent_sentiment(since, TRENDING_LIMIT).await {
        Ok(rows) => {
            let stocks: Vec<TrendingStock> = rows.into_iter().map(TrendingStock::from).collect();
            info!("Serving {} trending stocks since {}", stocks.len(), since);
            HandlerResponse::ok(json!({
                "success": true,
                "stocks": stocks,
            }))
        }
        Err(err) => failure_response(&err),
    }
}

pub fn failure_response(err: &CoreError) -> HandlerResponse {
    report(err);
    HandlerResponse::failure(500, "Failed to fetch sentiment data", Some(err.to_string()))
}

pub async fn trending<D: SentimentStore>(store: &D) -> HandlerResponse {
    trending_at(store, Utc::now()).await
}
