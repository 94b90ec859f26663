use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Sentiment API error: {0}")]
    SentimentApi(#[from] SentimentApiError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<redis::RedisError> for CoreError {
    fn from(err: redis::RedisError) -> Self {
        CoreError::Cache(CacheError::Redis(err))
    }
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum SentimentApiError {
    #[error("Failed to fetch Reddit sentiment data: upstream returned status {status_code}")]
    UnexpectedStatus { status_code: u16 },

    #[error("Request timeout for {endpoint}")]
    RequestTimeout { endpoint: String },

    #[error("Invalid sentiment payload: {details}")]
    InvalidPayload { details: String },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("{0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt cache entry under {key}: {details}")]
    CorruptEntry { key: String, details: String },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Insert into {table} failed with status {status_code}: {message}")]
    InsertFailed {
        table: String,
        status_code: u16,
        message: String,
    },

    #[error("Query on {table} failed with status {status_code}: {message}")]
    QueryFailed {
        table: String,
        status_code: u16,
        message: String,
    },

    #[error("Unauthorized for table {table}")]
    Unauthorized { table: String },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },
}
