use crate::error::ConfigError;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "stonks-app:v1.0";

/// Credentials for the Reddit client-credentials grant.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditConfig {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, "REDDIT_CLIENT_ID")?,
            client_secret: required(&lookup, "REDDIT_CLIENT_SECRET")?,
            user_agent: lookup("REDDIT_USER_AGENT")
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub redis_url: String,
}

impl CacheConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let redis_url = required(&lookup, "REDIS_URL")?;
        if !(redis_url.starts_with("redis://") || redis_url.starts_with("rediss://")) {
            return Err(ConfigError::InvalidValue {
                field: "REDIS_URL".to_string(),
                value: "expected a redis:// or rediss:// URL".to_string(),
            });
        }
        Ok(Self { redis_url })
    }
}

/// Supabase project URL and service-role key.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Url,
    pub service_key: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = required(&lookup, "NEXT_PUBLIC_SUPABASE_URL")
            .or_else(|_| required(&lookup, "SUPABASE_URL"))
            .map_err(|_| ConfigError::MissingEnvironmentVariable {
                var_name: "NEXT_PUBLIC_SUPABASE_URL".to_string(),
            })?;

        let url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidValue {
            field: "NEXT_PUBLIC_SUPABASE_URL".to_string(),
            value: e.to_string(),
        })?;

        Ok(Self {
            url,
            service_key: required(&lookup, "SUPABASE_SERVICE_KEY")?,
        })
    }
}

fn required<F>(lookup: &F, var_name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(ConfigError::MissingField {
            field: var_name.to_string(),
        }),
        None => Err(ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        }),
    }
}
