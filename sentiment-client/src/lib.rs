use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use stonks_core::{CoreError, SentimentApiError, SentimentSource};
use tracing::{debug, error, info};

pub const TRADESTIE_REDDIT_ENDPOINT: &str = "https://tradestie.com/api/v1/apps/reddit";

/// Client for the Tradestie WallStreetBets sentiment feed.
#[derive(Debug, Clone)]
pub struct SentimentClient {
    http_client: Client,
    endpoint: String,
}

impl SentimentClient {
    pub fn new(user_agent: &str) -> Result<Self, CoreError> {
        Self::with_endpoint(user_agent, TRADESTIE_REDDIT_ENDPOINT.to_string())
    }

    pub fn with_endpoint(user_agent: &str, endpoint: String) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch(&self) -> Result<Vec<Value>, CoreError> {
        info!("Fetching sentiment data from {}", self.endpoint);

        let response = self
            .http_client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| {
                error!("Network error fetching sentiment data: {}", e);
                if e.is_timeout() {
                    CoreError::SentimentApi(SentimentApiError::RequestTimeout {
                        endpoint: self.endpoint.clone(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        // Anything other than a plain 200 is terminal, including other 2xx codes.
        if response.status() != StatusCode::OK {
            error!(
                "Sentiment endpoint returned status {}",
                response.status()
            );
            return Err(CoreError::SentimentApi(SentimentApiError::UnexpectedStatus {
                status_code: response.status().as_u16(),
            }));
        }

        let body: Value = response.json().await.map_err(|e| {
            error!("Failed to decode sentiment payload: {}", e);
            CoreError::SentimentApi(SentimentApiError::InvalidPayload {
                details: e.to_string(),
            })
        })?;

        let items = parse_payload(body)?;
        debug!("Sentiment endpoint returned {} items", items.len());
        Ok(items)
    }
}

impl SentimentSource for SentimentClient {
    async fn fetch_sentiment(&self) -> Result<Vec<Value>, CoreError> {
        self.fetch().await
    }
}

/// Unwraps the top-level JSON array the feed returns.
pub fn parse_payload(body: Value) -> Result<Vec<Value>, SentimentApiError> {
    match body {
        Value::Array(items) => Ok(items),
        other => Err(SentimentApiError::InvalidPayload {
            details: format!("expected a JSON array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
