//! topstats.gg REST API client implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
    RetryTransientMiddleware, Retryable, RetryableStrategy, default_on_request_failure,
    policies::ExponentialBackoff,
};
use reqwest_tracing::TracingMiddleware;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::auth::ApiToken;
use crate::error::TopStatsError;
use crate::rate_limit::{EndpointRegistry, RateLimitConfig, endpoint_key};
use crate::rest::endpoints::TOPSTATS_BASE_URL;

/// The topstats.gg REST API client.
///
/// Every request goes through one dispatcher which applies the client-side
/// rate limits, retries short server-side rate limits and network failures,
/// and maps responses to [`TopStatsError`]s. A `404 Not Found` is returned as
/// `Ok(None)`.
///
/// Clones share the same HTTP session, rate limiters and closed flag.
///
/// # Example
///
/// ```rust,no_run
/// use topstats::TopStatsClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = TopStatsClient::new("your-topstats-token")?;
///
///     if let Some(bot) = client.get_bot(432610292342587392).await? {
///         println!("{} is in {} servers", bot.name, bot.server_count.value);
///     }
///
///     client.close();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct TopStatsClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
    registry: Arc<EndpointRegistry>,
    closed: Arc<AtomicBool>,
}

/// Result of a single HTTP round trip, before retry handling.
#[derive(Debug)]
pub(crate) enum Outcome {
    Success(Value),
    NotFound,
    RateLimited(Duration),
    Failure {
        status: Option<u16>,
        message: Option<String>,
    },
}

impl TopStatsClient {
    /// Create a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`TopStatsError::MissingToken`] if the token is blank.
    pub fn new(token: impl Into<ApiToken>) -> Result<Self, TopStatsError> {
        Self::builder().token(token).build()
    }

    /// Create a client with the token read from `TOPSTATS_TOKEN`.
    pub fn from_env() -> Result<Self, TopStatsError> {
        Self::builder().token(ApiToken::from_env()?).build()
    }

    /// Create a new client builder.
    pub fn builder() -> TopStatsClientBuilder {
        TopStatsClientBuilder::new()
    }

    /// Close the client.
    ///
    /// Every call made afterwards, through this handle or any clone, fails
    /// with [`TopStatsError::ClientClosed`] without touching the network.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("topstats client closed");
        }
    }

    /// Check if the client was closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The rate limit bookkeeping of this client.
    pub fn rate_limits(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// GET a path and decode the payload.
    pub(crate) async fn get<T>(&self, path: &str) -> Result<Option<T>, TopStatsError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        self.dispatch(path, &url).await?.map(decode).transpose()
    }

    /// GET a path with query parameters and decode the payload.
    pub(crate) async fn get_with_params<T, Q>(
        &self,
        path: &str,
        params: &Q,
    ) -> Result<Option<T>, TopStatsError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let query_string = serde_urlencoded::to_string(params)
            .map_err(|e| TopStatsError::InvalidArgument(e.to_string()))?;
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query_string)
        };
        self.dispatch(path, &url).await?.map(decode).transpose()
    }

    /// Run one logical request: cooldown check, rate limiting, HTTP call and
    /// short rate limit retries.
    async fn dispatch(&self, path: &str, url: &str) -> Result<Option<Value>, TopStatsError> {
        let key = endpoint_key(path);
        let config = self.registry.config();
        let limiters = self.registry.limiters_for(&key).await;
        let mut short_waits = 0;

        loop {
            // Checked on every pass: close() may run while this call sleeps.
            if self.is_closed() {
                return Err(TopStatsError::ClientClosed);
            }

            if let Some(retry_after) = self.registry.cooldown_for(&key).await {
                debug!(
                    endpoint = %key,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "endpoint cooling down"
                );
                return Err(TopStatsError::RateLimited { retry_after });
            }

            if config.enabled {
                limiters.acquire().await;

                if self.is_closed() {
                    limiters.release().await;
                    return Err(TopStatsError::ClientClosed);
                }
            }
            let outcome = self.send_once(url).await;
            if config.enabled {
                limiters.release().await;
            }

            match outcome {
                Outcome::Success(payload) => return Ok(Some(payload)),
                Outcome::NotFound => {
                    debug!(endpoint = %key, "resource not found");
                    return Ok(None);
                }
                Outcome::RateLimited(wait) => {
                    if wait > config.max_retry_wait || short_waits >= config.max_ratelimit_retries {
                        if let Some(until) = Instant::now().checked_add(wait) {
                            self.registry.set_cooldown(&key, until).await;
                        }
                        return Err(TopStatsError::RateLimited { retry_after: wait });
                    }

                    short_waits += 1;
                    warn!(
                        endpoint = %key,
                        wait_ms = wait.as_millis() as u64,
                        attempt = short_waits,
                        "rate limited by the API, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Outcome::Failure { status, message } => {
                    return Err(TopStatsError::request(status, message));
                }
            }
        }
    }

    /// Perform a single GET and classify the response.
    async fn send_once(&self, url: &str) -> Outcome {
        let mut request = self.http_client.get(url).headers(self.headers.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                return Outcome::Failure {
                    status: None,
                    message: Some(error.to_string()),
                };
            }
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

        // The API sends JSON bodies on errors too; anything unparseable is
        // treated as an empty object.
        let payload = match response.bytes().await {
            Ok(body) => serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::Object(serde_json::Map::new())),
            Err(_) => Value::Object(serde_json::Map::new()),
        };

        match status {
            StatusCode::NOT_FOUND => Outcome::NotFound,
            StatusCode::TOO_MANY_REQUESTS => {
                let wait = payload
                    .get("expiresIn")
                    .and_then(Value::as_f64)
                    .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
                    .or(retry_after)
                    .unwrap_or(Duration::ZERO);
                Outcome::RateLimited(wait)
            }
            status if status.is_success() => Outcome::Success(payload),
            status => Outcome::Failure {
                status: Some(status.as_u16()),
                message: payload
                    .get("message")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .or_else(|| status.canonical_reason().map(String::from)),
            },
        }
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, TopStatsError> {
    serde_json::from_value(payload)
        .map_err(|e| TopStatsError::InvalidResponse(format!("Failed to parse response: {e}")))
}

impl std::fmt::Debug for TopStatsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopStatsClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Retry only requests that never produced a response. HTTP statuses,
/// including 429 and 5xx, are left to the dispatcher.
struct NetworkFailuresOnly;

impl RetryableStrategy for NetworkFailuresOnly {
    fn handle(
        &self,
        res: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(_) => None,
            Err(error) => default_on_request_failure(error),
        }
    }
}

/// Builder for [`TopStatsClient`].
pub struct TopStatsClientBuilder {
    token: Option<ApiToken>,
    base_url: String,
    http_client: Option<reqwest::Client>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    max_retries: u32,
    rate_limit: RateLimitConfig,
}

impl TopStatsClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            token: None,
            base_url: TOPSTATS_BASE_URL.to_string(),
            http_client: None,
            user_agent: None,
            timeout: None,
            max_retries: 3,
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Set the API token.
    pub fn token(mut self, token: impl Into<ApiToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Reuse an existing `reqwest` client instead of creating one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set a timeout for each HTTP attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of retries for network failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the rate limit configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// - [`TopStatsError::MissingToken`] if no token (or a blank one) was set.
    /// - [`TopStatsError::Url`] if the base URL does not parse.
    /// - [`TopStatsError::InvalidArgument`] for an unusable rate limit window
    ///   or a token that is not a valid header value.
    pub fn build(self) -> Result<TopStatsClient, TopStatsError> {
        let token = self
            .token
            .filter(|token| !token.is_empty())
            .ok_or(TopStatsError::MissingToken)?;

        Url::parse(&self.base_url)?;
        self.rate_limit.validate()?;

        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(token.expose_secret()).map_err(|_| {
            TopStatsError::InvalidArgument(
                "The API token contains characters not allowed in a header.".to_string(),
            )
        })?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self.user_agent.unwrap_or_else(|| {
            format!(
                "topstats ({} {}) Rust/",
                env!("CARGO_PKG_REPOSITORY"),
                env!("CARGO_PKG_VERSION")
            )
        });
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("topstats"));
        headers.insert(USER_AGENT, header_value);

        let reqwest_client = self.http_client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .build()
                .unwrap_or_else(|_| reqwest::Client::new())
        });

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(500), Duration::from_secs(4))
            .base(2)
            .build_with_max_retries(self.max_retries);

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                NetworkFailuresOnly,
            ))
            .build();

        Ok(TopStatsClient {
            http_client: client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            headers,
            timeout: self.timeout,
            registry: Arc::new(EndpointRegistry::new(self.rate_limit)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl Default for TopStatsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TopStatsClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopStatsClientBuilder")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .field("max_retries", &self.max_retries)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}
