pub mod api;


use api::RedditApiClient;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, Scope, TokenResponse,
    TokenUrl,
};
use std::time::{Duration, SystemTime};
use stonks_core::{CoreError, PostSource, RedditApiError, RedditConfig, RedditPost};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are treated as expired this long before Reddit says they are.
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(SystemTime::now())
    }
}

/// Application-only Reddit client using the client-credentials grant.
///
/// The access token is cached for the lifetime of the client and refreshed
/// once it is within a minute of expiring.
pub struct RedditClient {
    config: RedditConfig,
    oauth_client: BasicClient,
    api: RedditApiClient,
    token: Mutex<Option<RedditToken>>,
}

impl RedditClient {
    pub fn new(config: RedditConfig) -> Result<Self, CoreError> {
        Self::with_endpoints(config, REDDIT_TOKEN_URL, api::REDDIT_API_BASE)
    }

    /// Builds a client against explicit token and API hosts.
    pub fn with_endpoints(
        config: RedditConfig,
        token_url: &str,
        api_base: &str,
    ) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("Invalid Reddit auth URL: {e}"),
            }
        })?;
        let token_url = TokenUrl::new(token_url.to_string()).map_err(|e| {
            CoreError::Internal {
                message: format!("Invalid Reddit token URL: {e}"),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::BasicAuth);

        let api = RedditApiClient::with_base_url(config.user_agent.clone(), api_base.to_string())?;

        Ok(Self {
            config,
            oauth_client,
            api,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RedditConfig {
        &self.config
    }

    pub fn get_required_scopes() -> Vec<&'static str> {
        vec!["read"]
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .lock()
            .await
            .as_ref()
            .map(RedditToken::is_valid)
            .unwrap_or(false)
    }

    pub async fn set_token(&self, token: RedditToken) {
        *self.token.lock().await = Some(token);
    }

    /// Performs the client-credentials exchange and caches the new token.
    pub async fn authenticate(&self) -> Result<RedditToken, CoreError> {
        info!("Requesting Reddit application-only access token");

        let http_client = self.api.http_client().clone();
        let mut request = self.oauth_client.exchange_client_credentials();
        for scope in Self::get_required_scopes() {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let response = request
            .request_async(|req| send_token_request(&http_client, req))
            .await
            .map_err(|e| {
                error!("Reddit token exchange failed: {}", e);
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                })
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let token = RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime.saturating_sub(TOKEN_EXPIRY_BUFFER),
            scope: response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| (**s).clone()).collect())
                .unwrap_or_else(|| vec!["read".to_string()]),
        };

        *self.token.lock().await = Some(token.clone());
        info!("Reddit access token obtained, valid for {:?}", lifetime);
        Ok(token)
    }

    async fn access_token(&self) -> Result<String, CoreError> {
        if let Some(token) = self.token.lock().await.as_ref() {
            if token.is_valid() {
                debug!("Reusing cached Reddit access token");
                return Ok(token.access_token.clone());
            }
        }
        Ok(self.authenticate().await?.access_token)
    }

    pub async fn fetch_hot_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let access_token = self.access_token().await?;
        let listing = self
            .api
            .get_hot_posts(&access_token, subreddit, limit)
            .await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| RedditPost::from(child.data))
            .collect())
    }
}

impl PostSource for RedditClient {
    async fn hot_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<RedditPost>, CoreError> {
        self.fetch_hot_posts(subreddit, limit).await
    }
}

async fn send_token_request(
    http_client: &reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
