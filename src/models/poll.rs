//! Poll model

use super::Entity;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A poll attached to a tweet
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Poll {
    /// Unique poll id
    pub id: String,
    /// The choices, in display order
    pub options: Vec<PollOption>,
    /// How long the poll runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// When voting closes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    /// `open` or `closed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_status: Option<String>,
    /// Fields not modeled above, kept verbatim
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// One poll choice
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollOption {
    /// 1-based display position
    pub position: u32,
    /// Choice text
    pub label: String,
    /// Votes received so far
    #[serde(default)]
    pub votes: u64,
}

impl Entity for Poll {
    const KIND: &'static str = "poll";
    const REQUIRED_FIELDS: &'static [&'static str] = &["id", "options"];
}

impl Poll {
    /// Whether voting has closed
    pub fn is_closed(&self) -> bool {
        self.voting_status.as_deref() == Some("closed")
    }

    /// Total votes across all options
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| o.votes).sum()
    }

    /// The leading option, if any votes have been cast
    pub fn leader(&self) -> Option<&PollOption> {
        self.options
            .iter()
            .filter(|o| o.votes > 0)
            .max_by_key(|o| o.votes)
    }
}
