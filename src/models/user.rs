//! User model

use super::Entity;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Twitter user
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    /// Unique user id
    pub id: String,
    /// Display name
    pub name: String,
    /// Handle, without the leading `@`
    pub username: String,
    /// Account creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Profile bio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form profile location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Profile image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// Whether tweets are protected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    /// Whether the account carries a verified badge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    /// Follower and tweet counts, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<UserMetrics>,
    /// Fields not modeled above, kept verbatim
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Public counters on a user profile
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserMetrics {
    /// How many accounts follow this user
    #[serde(default)]
    pub followers_count: u64,
    /// How many accounts this user follows
    #[serde(default)]
    pub following_count: u64,
    /// Lifetime tweet count
    #[serde(default)]
    pub tweet_count: u64,
    /// Lists this user appears on
    #[serde(default)]
    pub listed_count: u64,
}

impl Entity for User {
    const KIND: &'static str = "user";
    const REQUIRED_FIELDS: &'static [&'static str] = &["id", "name", "username"];
}

impl User {
    /// The user's profile URL
    pub fn profile_url(&self) -> String {
        format!("https://twitter.com/{}", self.username)
    }

    /// Mention string for this user, `@username`
    pub fn mention(&self) -> String {
        format!("@{}", self.username)
    }
}
