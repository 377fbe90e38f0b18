//! HTTP client for the Twitter API
//!
//! Builds authenticated requests and maps response statuses onto the
//! error taxonomy. Failures surface immediately to the caller; there is
//! no retry loop, no backoff, and no internal sleeping. A 429 becomes
//! [`Error::RateLimited`] carrying the server's retry-after hint.

use crate::auth::OauthSession;
use crate::error::{Error, Result};
use crate::types::StringMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".to_string(),
            timeout: Duration::from_secs(30),
            default_headers: StringMap::new(),
            user_agent: format!("perch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// How a request is authenticated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStrategy {
    /// No Authorization header
    None,
    /// App-only bearer token
    #[default]
    Bearer,
    /// User-context OAuth1 signature
    OAuth1,
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, sorted so they feed the OAuth1 signature directly
    pub query: BTreeMap<String, String>,
    /// Request headers
    pub headers: StringMap,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Authentication strategy
    pub auth: AuthStrategy,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add an optional query parameter, skipped when `None`
    #[must_use]
    pub fn query_opt(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.query.insert(key.into(), value);
        }
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the authentication strategy
    #[must_use]
    pub fn auth(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }
}

/// HTTP client bound to a base URL and an optional auth session
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    session: Option<Arc<OauthSession>>,
}

impl HttpClient {
    /// Create a client without authentication
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            session: None,
        })
    }

    /// Create a client that signs requests with the given session
    pub fn with_session(config: HttpClientConfig, session: Arc<OauthSession>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.session = Some(session);
        Ok(client)
    }

    /// The auth session, when one is attached
    pub fn session(&self) -> Option<&Arc<OauthSession>> {
        self.session.as_ref()
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, path, config).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::POST, path, config).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::DELETE, path, config).await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::PUT, path, config).await
    }

    /// Make a generic request
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let full_url = self.build_url(path);

        let mut req = self.client.request(method.clone(), &full_url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        if let Some(ref body) = config.body {
            req = req.json(body);
        }

        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }

        req = self.apply_auth(req, method.as_str(), &full_url, &config)?;

        let response = req.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::rate_limited(extract_retry_after(&response)));
        }

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status.as_u16(), extract_error_message(&body)));
        }

        debug!(%method, url = %full_url, status = status.as_u16(), "request succeeded");
        Ok(response)
    }

    /// Make a request and parse the JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, path, config).await?;
        let json: T = response.json().await?;
        Ok(json)
    }

    /// Make a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        self.request_json(Method::GET, path, config).await
    }

    fn apply_auth(
        &self,
        req: reqwest::RequestBuilder,
        method: &str,
        url: &str,
        config: &RequestConfig,
    ) -> Result<reqwest::RequestBuilder> {
        match config.auth {
            AuthStrategy::None => Ok(req),
            AuthStrategy::Bearer => {
                let session = self.require_session()?;
                Ok(req.header("Authorization", session.bearer_header()?))
            }
            AuthStrategy::OAuth1 => {
                let session = self.require_session()?;
                // JSON bodies are not part of the OAuth1 base string;
                // only the query parameters are signed.
                let header = session.sign(method, url, &config.query)?;
                Ok(req.header("Authorization", header))
            }
        }
    }

    fn require_session(&self) -> Result<&Arc<OauthSession>> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::auth("no credentials attached to this client"))
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract the retry-after header value from a 429 response
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Pull a human-readable message out of a Twitter error body.
///
/// v1.1 responds with `{"errors":[{"message":...}]}`, v2 with
/// `{"detail":...}`. Anything else passes through verbatim.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value
            .get("errors")
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return message.to_string();
        }
        if let Some(detail) = value.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
    }
    body.to_string()
}
