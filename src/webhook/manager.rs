//! Webhook subscription lifecycle
//!
//! Tracks one webhook registration per environment through its states:
//!
//! ```text
//! Unregistered --register--> Pending --CRC ok--> Active
//!      Active --remove, or 3 consecutive rejected deliveries--> Inactive
//!      Inactive --CRC ok--> Active
//! ```
//!
//! A rejected delivery is one whose signature header fails verification.
//! Any verified delivery or answered CRC resets the rejection count.

use super::events::{parse_events, ActivityEvent, EventKind};
use super::signature::{crc_response_token, verify_payload};
use crate::error::{Error, Result};
use crate::http::{AuthStrategy, HttpClient, RequestConfig};
use crate::types::JsonValue;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Consecutive rejected deliveries before the subscription is parked
const MAX_REJECTED_DELIVERIES: u32 = 3;

/// Where a managed webhook currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No webhook registered yet
    Unregistered,
    /// Registered, waiting for the first CRC to pass
    Pending,
    /// CRC passed; deliveries are expected
    Active,
    /// Removed, or parked after repeated rejected deliveries
    Inactive,
}

/// A registered webhook as the API reports it
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookInfo {
    /// Webhook id assigned at registration
    pub id: String,
    /// The delivery URL
    pub url: String,
    /// Whether the API currently considers the webhook valid
    #[serde(default)]
    pub valid: bool,
}

/// One subscribed user in a subscription list
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    /// The subscribed user's id
    pub user_id: String,
}

/// A subscription list for an environment
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionList {
    /// The environment name
    pub environment: String,
    /// The owning application id
    pub application_id: String,
    /// Every subscribed user
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

type Handler = Box<dyn Fn(&ActivityEvent) -> anyhow::Result<()> + Send + Sync>;

/// Manages one account-activity webhook and its event handlers
pub struct SubscriptionManager {
    http: HttpClient,
    environment: String,
    consumer_secret: String,
    state: SubscriptionState,
    webhook: Option<WebhookInfo>,
    rejected_deliveries: u32,
    handlers: Vec<(EventKind, Handler)>,
}

impl SubscriptionManager {
    /// Create a manager for an account-activity environment.
    ///
    /// The client must carry a session with a consumer secret, since
    /// that secret keys both CRC answers and delivery verification.
    pub fn new(http: HttpClient, environment: impl Into<String>) -> Result<Self> {
        let consumer_secret = http
            .session()
            .and_then(|s| s.credentials().consumer_secret())
            .ok_or_else(|| Error::auth("webhook management requires a consumer secret"))?
            .to_string();

        Ok(Self {
            http,
            environment: environment.into(),
            consumer_secret,
            state: SubscriptionState::Unregistered,
            webhook: None,
            rejected_deliveries: 0,
            handlers: Vec::new(),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// The registered webhook, once [`register`](Self::register) has run
    pub fn webhook(&self) -> Option<&WebhookInfo> {
        self.webhook.as_ref()
    }

    /// Consecutive rejected deliveries since the last verified one
    pub fn rejected_deliveries(&self) -> u32 {
        self.rejected_deliveries
    }

    /// Register a delivery URL for this environment.
    ///
    /// Moves the subscription to `Pending`; the API will issue a CRC
    /// challenge to the URL before deliveries start.
    pub async fn register(&mut self, url: &str) -> Result<&WebhookInfo> {
        let endpoint = format!("/1.1/account_activity/all/{}/webhooks.json", self.environment);
        let info: WebhookInfo = self
            .http
            .request_json(
                reqwest::Method::POST,
                &endpoint,
                RequestConfig::new()
                    .query("url", url)
                    .auth(AuthStrategy::OAuth1),
            )
            .await?;

        debug!(webhook_id = %info.id, url = %info.url, "webhook registered");
        self.state = SubscriptionState::Pending;
        self.rejected_deliveries = 0;
        Ok(self.webhook.insert(info))
    }

    /// Remove the registered webhook and park the subscription.
    pub async fn remove(&mut self) -> Result<()> {
        let webhook = self
            .webhook
            .take()
            .ok_or_else(|| Error::auth("no webhook registered"))?;

        let endpoint = format!(
            "/1.1/account_activity/all/{}/webhooks/{}.json",
            self.environment, webhook.id
        );
        self.http
            .delete(&endpoint, RequestConfig::new().auth(AuthStrategy::OAuth1))
            .await?;

        debug!(webhook_id = %webhook.id, "webhook removed");
        self.state = SubscriptionState::Inactive;
        Ok(())
    }

    /// Ask the API to re-issue a CRC challenge to the registered URL.
    pub async fn request_crc_check(&self) -> Result<()> {
        let webhook = self
            .webhook
            .as_ref()
            .ok_or_else(|| Error::auth("no webhook registered"))?;

        let endpoint = format!(
            "/1.1/account_activity/all/{}/webhooks/{}.json",
            self.environment, webhook.id
        );
        self.http
            .put(&endpoint, RequestConfig::new().auth(AuthStrategy::OAuth1))
            .await?;
        Ok(())
    }

    /// Subscribe the authenticated user's activity to this webhook.
    pub async fn subscribe(&self) -> Result<()> {
        let endpoint = format!(
            "/1.1/account_activity/all/{}/subscriptions.json",
            self.environment
        );
        self.http
            .post(&endpoint, RequestConfig::new().auth(AuthStrategy::OAuth1))
            .await?;
        Ok(())
    }

    /// Drop the authenticated user's subscription.
    pub async fn unsubscribe(&self) -> Result<()> {
        let endpoint = format!(
            "/1.1/account_activity/all/{}/subscriptions.json",
            self.environment
        );
        self.http
            .delete(&endpoint, RequestConfig::new().auth(AuthStrategy::OAuth1))
            .await?;
        Ok(())
    }

    /// List every user subscribed in this environment.
    pub async fn list_subscriptions(&self) -> Result<SubscriptionList> {
        let endpoint = format!(
            "/1.1/account_activity/all/{}/subscriptions/list.json",
            self.environment
        );
        self.http
            .get_json(&endpoint, RequestConfig::new().auth(AuthStrategy::Bearer))
            .await
    }

    /// Answer a CRC challenge.
    ///
    /// Returns the JSON body the challenge response must carry. A
    /// passed CRC (re)activates the subscription and clears the
    /// rejected-delivery count.
    pub fn respond_crc(&mut self, crc_token: &str) -> JsonValue {
        let token = crc_response_token(&self.consumer_secret, crc_token);
        if self.state != SubscriptionState::Unregistered {
            self.state = SubscriptionState::Active;
        }
        self.rejected_deliveries = 0;
        json!({ "response_token": token })
    }

    /// Register a handler for one event family.
    ///
    /// Handlers for a family run in registration order for each of its
    /// events. A handler error is logged and does not stop later
    /// handlers.
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&ActivityEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// Ingest one delivery: verify its signature, decode its events, and
    /// run each event through the handlers registered for its family.
    ///
    /// A failed signature drops the delivery with
    /// [`Error::InvalidSignature`]; three consecutive drops park the
    /// subscription as `Inactive`. Returns the number of events decoded.
    pub fn receive(&mut self, body: &[u8], signature_header: &str) -> Result<usize> {
        if !verify_payload(&self.consumer_secret, body, signature_header) {
            self.rejected_deliveries += 1;
            warn!(
                rejected = self.rejected_deliveries,
                "delivery signature rejected"
            );
            if self.rejected_deliveries >= MAX_REJECTED_DELIVERIES
                && self.state == SubscriptionState::Active
            {
                warn!("too many rejected deliveries, parking subscription");
                self.state = SubscriptionState::Inactive;
            }
            return Err(Error::InvalidSignature);
        }
        self.rejected_deliveries = 0;

        let payload: JsonValue = serde_json::from_slice(body)?;
        let events = parse_events(&payload);
        debug!(events = events.len(), "delivery accepted");

        for event in &events {
            for (kind, handler) in &self.handlers {
                if *kind != event.kind {
                    continue;
                }
                if let Err(error) = handler(event) {
                    warn!(kind = ?event.kind, %error, "event handler failed");
                }
            }
        }
        Ok(events.len())
    }
}

impl std::fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("environment", &self.environment)
            .field("state", &self.state)
            .field("webhook", &self.webhook)
            .field("rejected_deliveries", &self.rejected_deliveries)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
