//! Direct message model
//!
//! The v1.1 events API nests the interesting fields two levels down
//! (`message_create.message_data.text`); the struct mirrors the wire
//! shape and exposes flat accessors on top.

use super::Entity;
use crate::types::JsonObject;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A direct message event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectMessage {
    /// Unique event id
    pub id: String,
    /// Creation time as epoch milliseconds, stringly typed on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<String>,
    /// The nested message body
    pub message_create: MessageCreate,
    /// Fields not modeled above, kept verbatim
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// The `message_create` envelope of a direct message event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageCreate {
    /// The recipient
    pub target: MessageTarget,
    /// Id of the sending user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// The message content
    pub message_data: MessageData,
}

/// The recipient of a direct message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageTarget {
    /// Id of the receiving user
    pub recipient_id: String,
}

/// The content of a direct message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageData {
    /// Message text
    pub text: String,
    /// Entities (hashtags, urls, mentions), kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<serde_json::Value>,
}

impl Entity for DirectMessage {
    const KIND: &'static str = "direct_message";
    const REQUIRED_FIELDS: &'static [&'static str] = &["id", "message_create"];
}

impl DirectMessage {
    /// The message text
    pub fn text(&self) -> &str {
        &self.message_create.message_data.text
    }

    /// Id of the sending user, when the API included it
    pub fn sender_id(&self) -> Option<&str> {
        self.message_create.sender_id.as_deref()
    }

    /// Id of the receiving user
    pub fn recipient_id(&self) -> &str {
        &self.message_create.target.recipient_id
    }

    /// Creation time decoded from the epoch-millisecond string
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.created_timestamp.as_deref()?.parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}
