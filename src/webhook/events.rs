//! Account-activity event decoding
//!
//! A delivery body is a JSON object with a `for_user_id` and one or more
//! event arrays keyed by discriminant (`tweet_create_events`,
//! `direct_message_events`, ...). Unknown keys are ignored so new event
//! families do not break decoding.

use crate::types::JsonValue;
use serde_json::Value;

/// The event families carried by account-activity deliveries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A direct message was sent or received
    DirectMessage,
    /// A typing indicator in a direct-message conversation
    DirectMessageTyping,
    /// A direct-message conversation was marked read
    DirectMessageMarkRead,
    /// A tweet was liked
    Favorite,
    /// A follow or follow-back
    Follow,
    /// A block was created or removed
    Block,
    /// A mute was created or removed
    Mute,
    /// A tweet was created by or mentioning the subscribed user
    TweetCreate,
    /// A tweet was deleted
    TweetDelete,
}

impl EventKind {
    /// All kinds, in the order they are scanned out of a delivery
    pub const ALL: [EventKind; 9] = [
        EventKind::DirectMessage,
        EventKind::DirectMessageTyping,
        EventKind::DirectMessageMarkRead,
        EventKind::Favorite,
        EventKind::Follow,
        EventKind::Block,
        EventKind::Mute,
        EventKind::TweetCreate,
        EventKind::TweetDelete,
    ];

    /// The JSON key this kind appears under in a delivery body
    pub fn key(self) -> &'static str {
        match self {
            EventKind::DirectMessage => "direct_message_events",
            EventKind::DirectMessageTyping => "direct_message_indicate_typing_events",
            EventKind::DirectMessageMarkRead => "direct_message_mark_read_events",
            EventKind::Favorite => "favorite_events",
            EventKind::Follow => "follow_events",
            EventKind::Block => "block_events",
            EventKind::Mute => "mute_events",
            EventKind::TweetCreate => "tweet_create_events",
            EventKind::TweetDelete => "tweet_delete_events",
        }
    }

    /// Map a delivery key back to its kind
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }
}

/// One decoded activity event
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    /// Which event family this belongs to
    pub kind: EventKind,
    /// The subscribed user the delivery was for
    pub for_user_id: Option<String>,
    /// Id of the acting user, where the payload names one
    pub source_id: Option<String>,
    /// Id of the user acted on, where the payload names one
    pub target_id: Option<String>,
    /// Event time as epoch milliseconds, where the payload carries one
    pub created_timestamp: Option<String>,
    /// The raw event object as delivered
    pub payload: JsonValue,
}

/// Decode every event in a delivery body.
///
/// Families are scanned in [`EventKind::ALL`] order; events within a
/// family keep their delivery order. A body with no recognized event
/// arrays decodes to an empty list.
pub fn parse_events(body: &JsonValue) -> Vec<ActivityEvent> {
    let Some(object) = body.as_object() else {
        return Vec::new();
    };

    let for_user_id = object
        .get("for_user_id")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let mut events = Vec::new();
    for kind in EventKind::ALL {
        let Some(items) = object.get(kind.key()).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            let (source_id, target_id) = extract_refs(kind, item);
            events.push(ActivityEvent {
                kind,
                for_user_id: for_user_id.clone(),
                source_id,
                target_id,
                created_timestamp: extract_timestamp(item),
                payload: item.clone(),
            });
        }
    }
    events
}

/// Best-effort source/target user ids; the payload shape differs per
/// family, and older families stringify ids differently.
fn extract_refs(kind: EventKind, payload: &Value) -> (Option<String>, Option<String>) {
    let id_at = |path: &[&str]| -> Option<String> {
        let mut node = payload;
        for key in path {
            node = node.get(key)?;
        }
        node.as_str().map(str::to_owned)
    };

    match kind {
        EventKind::Follow | EventKind::Block | EventKind::Mute => {
            (id_at(&["source", "id"]), id_at(&["target", "id"]))
        }
        EventKind::Favorite => (
            id_at(&["user", "id_str"]),
            id_at(&["favorited_status", "user", "id_str"]),
        ),
        EventKind::TweetCreate => (id_at(&["user", "id_str"]), None),
        EventKind::TweetDelete => (id_at(&["status", "user_id"]), None),
        EventKind::DirectMessage
        | EventKind::DirectMessageTyping
        | EventKind::DirectMessageMarkRead => (
            id_at(&["message_create", "sender_id"]).or_else(|| id_at(&["sender_id"])),
            id_at(&["message_create", "target", "recipient_id"])
                .or_else(|| id_at(&["target", "recipient_id"])),
        ),
    }
}

fn extract_timestamp(payload: &Value) -> Option<String> {
    for key in ["created_timestamp", "timestamp_ms"] {
        if let Some(value) = payload.get(key).and_then(Value::as_str) {
            return Some(value.to_owned());
        }
    }
    None
}
