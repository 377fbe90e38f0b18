//! Tweet model

use super::Entity;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tweet
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tweet {
    /// Unique tweet id
    pub id: String,
    /// The tweet text
    pub text: String,
    /// Id of the authoring user, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Root tweet of the conversation thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// User replied to, for replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_user_id: Option<String>,
    /// BCP-47 language tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Sensitive-content flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possibly_sensitive: Option<bool>,
    /// Engagement counters, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<TweetMetrics>,
    /// Fields not modeled above, kept verbatim
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Public engagement counters on a tweet
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TweetMetrics {
    /// Retweets
    #[serde(default)]
    pub retweet_count: u64,
    /// Replies
    #[serde(default)]
    pub reply_count: u64,
    /// Likes
    #[serde(default)]
    pub like_count: u64,
    /// Quote tweets
    #[serde(default)]
    pub quote_count: u64,
}

impl Entity for Tweet {
    const KIND: &'static str = "tweet";
    const REQUIRED_FIELDS: &'static [&'static str] = &["id", "text"];
}

impl Tweet {
    /// Whether this tweet is a reply
    pub fn is_reply(&self) -> bool {
        self.in_reply_to_user_id.is_some()
    }

    /// Canonical URL for this tweet, when the author is known
    pub fn url(&self) -> Option<String> {
        self.author_id
            .as_ref()
            .map(|author| format!("https://twitter.com/{author}/status/{}", self.id))
    }
}
