//! Supabase persistence over the PostgREST HTTP API.

#[cfg(test)]
mod tests;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use stonks_core::{
    CoreError, DatabaseConfig, DatabaseError, SentimentRecord, SentimentRow, SentimentStore,
};
use tracing::{debug, error, info};
use url::Url;

pub const SENTIMENT_TABLE: &str = "reddit_sentiment";

const REST_PATH: &str = "rest/v1/";
const RECENT_COLUMNS: &str = "symbol,sentiment_label,sentiment_score,mention_count,timestamp";

pub struct Database {
    http_client: Client,
    rest_base: Url,
    service_key: String,
    table: String,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Result<Self, CoreError> {
        Self::with_table(config, SENTIMENT_TABLE)
    }

    pub fn with_table(config: &DatabaseConfig, table: &str) -> Result<Self, CoreError> {
        let rest_base = rest_base(&config.url).map_err(DatabaseError::from)?;
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http_client,
            rest_base,
            service_key: config.service_key.clone(),
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn table_url(&self) -> Result<Url, DatabaseError> {
        Ok(self.rest_base.join(&self.table)?)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Inserts the whole batch with a single POST.
    pub async fn insert_rows(&self, records: &[SentimentRecord]) -> Result<(), CoreError> {
        let url = self.table_url()?;
        info!("Inserting {} rows into {}", records.len(), self.table);

        let response = self
            .authorized(self.http_client.post(url))
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Insert into {} returned {}", self.table, response.status());
            return Ok(());
        }

        Err(self.failure(response, FailureKind::Insert).await.into())
    }

    pub async fn select_recent(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SentimentRow>, CoreError> {
        let url = self.table_url()?;
        debug!("Selecting {} rows from {} since {}", limit, self.table, since);

        let response = self
            .authorized(self.http_client.get(url))
            .query(&recent_query(since, limit))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.failure(response, FailureKind::Query).await.into());
        }

        let rows: Vec<SentimentRow> = response.json().await?;
        info!("Fetched {} rows from {}", rows.len(), self.table);
        Ok(rows)
    }

    async fn failure(&self, response: Response, kind: FailureKind) -> DatabaseError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        error!("{} on {} failed with {}: {}", kind.verb(), self.table, status, message);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return DatabaseError::Unauthorized {
                table: self.table.clone(),
            };
        }

        match kind {
            FailureKind::Insert => DatabaseError::InsertFailed {
                table: self.table.clone(),
                status_code: status.as_u16(),
                message,
            },
            FailureKind::Query => DatabaseError::QueryFailed {
                table: self.table.clone(),
                status_code: status.as_u16(),
                message,
            },
        }
    }
}

impl SentimentStore for Database {
    async fn insert_sentiment(&self, records: &[SentimentRecord]) -> Result<(), CoreError> {
        self.insert_rows(records).await
    }

    async fn recent_sentiment(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SentimentRow>, CoreError> {
        self.select_recent(since, limit).await
    }
}

#[derive(Debug, Clone, Copy)]
enum FailureKind {
    Insert,
    Query,
}

impl FailureKind {
    fn verb(self) -> &'static str {
        match self {
            FailureKind::Insert => "Insert",
            FailureKind::Query => "Query",
        }
    }
}

fn rest_base(project_url: &Url) -> Result<Url, url::ParseError> {
    let mut base = project_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REST_PATH)
}

/// PostgREST filters for rows newer than `since`, busiest tickers first.
pub fn recent_query(since: DateTime<Utc>, limit: u32) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), RECENT_COLUMNS.to_string()),
        (
            "timestamp".to_string(),
            format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ),
        ("order".to_string(), "mention_count.desc".to_string()),
        ("limit".to_string(), limit.to_string()),
    ]
}
