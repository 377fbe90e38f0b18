//! High-level API client
//!
//! Ties the pieces together: a [`Client`] owns one HTTP transport and
//! one auth session, and exposes the entity operations. Collection
//! endpoints hand back a [`Cursor`] instead of a flat list.

use crate::auth::{Credentials, OauthEndpoints, OauthSession};
use crate::error::{Error, Result};
use crate::http::{AuthStrategy, HttpClient, HttpClientConfig, RequestConfig};
use crate::models::{build, DirectMessage, Tweet, User};
use crate::pagination::Cursor;
use crate::stream::TweetStream;
use crate::types::JsonValue;
use crate::webhook::SubscriptionManager;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const USER_FIELDS: &str =
    "created_at,description,location,profile_image_url,protected,verified,public_metrics";
const TWEET_FIELDS: &str =
    "author_id,created_at,conversation_id,in_reply_to_user_id,lang,possibly_sensitive,public_metrics";

/// Builder for [`Client`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    credentials: Credentials,
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Set the credential set the client authenticates with
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Point the client at a different API host
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client> {
        let mut config = HttpClientConfig::builder();
        if let Some(ref base_url) = self.base_url {
            config = config.base_url(base_url.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            config = config.user_agent(user_agent);
        }

        let mut session = OauthSession::new(self.credentials);
        if let Some(base_url) = self.base_url {
            session = session.with_endpoints(OauthEndpoints::with_base(&base_url));
        }
        let session = Arc::new(session);
        let http = HttpClient::with_session(config.build(), Arc::clone(&session))?;

        Ok(Client { http, session })
    }
}

/// The API client
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    session: Arc<OauthSession>,
}

impl Client {
    /// Start building a client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Build a client over a credential set with default settings
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder().credentials(credentials).build()
    }

    /// The auth session backing this client
    pub fn session(&self) -> &Arc<OauthSession> {
        &self.session
    }

    /// The underlying HTTP transport
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // ============================================================================
    // Users
    // ============================================================================

    /// Fetch a user by id
    pub async fn fetch_user(&self, id: &str) -> Result<User> {
        let body: JsonValue = self
            .http
            .get_json(
                &format!("/2/users/{id}"),
                RequestConfig::new().query("user.fields", USER_FIELDS),
            )
            .await?;
        build(unwrap_data(body, "user")?)
    }

    /// Fetch a user by handle
    pub async fn fetch_user_by_username(&self, username: &str) -> Result<User> {
        let body: JsonValue = self
            .http
            .get_json(
                &format!("/2/users/by/username/{username}"),
                RequestConfig::new().query("user.fields", USER_FIELDS),
            )
            .await?;
        build(unwrap_data(body, "user")?)
    }

    /// Followers of a user, one page at a time
    pub fn followers(&self, user_id: &str) -> Cursor<User> {
        Cursor::new(self.http.clone(), format!("/2/users/{user_id}/followers"))
            .param("user.fields", USER_FIELDS)
    }

    /// Accounts a user follows, one page at a time
    pub fn following(&self, user_id: &str) -> Cursor<User> {
        Cursor::new(self.http.clone(), format!("/2/users/{user_id}/following"))
            .param("user.fields", USER_FIELDS)
    }

    // ============================================================================
    // Tweets
    // ============================================================================

    /// Fetch a tweet by id
    pub async fn fetch_tweet(&self, id: &str) -> Result<Tweet> {
        let body: JsonValue = self
            .http
            .get_json(
                &format!("/2/tweets/{id}"),
                RequestConfig::new().query("tweet.fields", TWEET_FIELDS),
            )
            .await?;
        build(unwrap_data(body, "tweet")?)
    }

    /// Post a tweet on behalf of the authenticated user
    pub async fn post_tweet(&self, text: &str) -> Result<Tweet> {
        let body: JsonValue = self
            .http
            .request_json(
                reqwest::Method::POST,
                "/2/tweets",
                RequestConfig::new()
                    .json(json!({ "text": text }))
                    .auth(AuthStrategy::OAuth1),
            )
            .await?;
        build(unwrap_data(body, "tweet")?)
    }

    /// Delete one of the authenticated user's tweets
    pub async fn delete_tweet(&self, id: &str) -> Result<bool> {
        let body: JsonValue = self
            .http
            .request_json(
                reqwest::Method::DELETE,
                &format!("/2/tweets/{id}"),
                RequestConfig::new().auth(AuthStrategy::OAuth1),
            )
            .await?;
        Ok(body["data"]["deleted"].as_bool().unwrap_or(false))
    }

    /// The author of a tweet, when the payload carried `author_id`
    pub async fn author_of(&self, tweet: &Tweet) -> Result<User> {
        let author_id = tweet
            .author_id
            .as_deref()
            .ok_or_else(|| Error::malformed("tweet", "author_id"))?;
        self.fetch_user(author_id).await
    }

    /// A user's recent tweets, one page at a time
    pub fn timeline(&self, user_id: &str) -> Cursor<Tweet> {
        Cursor::new(self.http.clone(), format!("/2/users/{user_id}/tweets"))
            .param("tweet.fields", TWEET_FIELDS)
    }

    // ============================================================================
    // Direct messages
    // ============================================================================

    /// Fetch a direct message event by id
    pub async fn fetch_direct_message(&self, id: &str) -> Result<DirectMessage> {
        let body: JsonValue = self
            .http
            .get_json(
                "/1.1/direct_messages/events/show.json",
                RequestConfig::new().query("id", id).auth(AuthStrategy::OAuth1),
            )
            .await?;
        build(unwrap_field(body, "event", "direct_message")?)
    }

    /// Send a direct message to a user
    pub async fn send_direct_message(
        &self,
        recipient_id: &str,
        text: &str,
    ) -> Result<DirectMessage> {
        let event = json!({
            "event": {
                "type": "message_create",
                "message_create": {
                    "target": { "recipient_id": recipient_id },
                    "message_data": { "text": text }
                }
            }
        });
        let body: JsonValue = self
            .http
            .request_json(
                reqwest::Method::POST,
                "/1.1/direct_messages/events/new.json",
                RequestConfig::new().json(event).auth(AuthStrategy::OAuth1),
            )
            .await?;
        build(unwrap_field(body, "event", "direct_message")?)
    }

    /// Delete a direct message event
    pub async fn delete_direct_message(&self, id: &str) -> Result<()> {
        self.http
            .delete(
                "/1.1/direct_messages/events/destroy.json",
                RequestConfig::new().query("id", id).auth(AuthStrategy::OAuth1),
            )
            .await?;
        Ok(())
    }

    // ============================================================================
    // Webhooks and streaming
    // ============================================================================

    /// A subscription manager for an account-activity environment
    pub fn subscription_manager(
        &self,
        environment: impl Into<String>,
    ) -> Result<SubscriptionManager> {
        SubscriptionManager::new(self.http.clone(), environment)
    }

    /// Connect to the sampled tweet stream
    pub async fn sample_stream(&self) -> Result<TweetStream> {
        TweetStream::connect(&self.http).await
    }
}

/// Pull the `data` object out of a v2 envelope
fn unwrap_data(body: JsonValue, entity: &str) -> Result<JsonValue> {
    unwrap_field(body, "data", entity)
}

fn unwrap_field(mut body: JsonValue, field: &str, entity: &str) -> Result<JsonValue> {
    match body.get_mut(field).map(JsonValue::take) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(Error::malformed(entity, field)),
    }
}
