//! Typed views over API payloads
//!
//! Models deserialize the documented fields and keep everything else in
//! a flattened `extra` map, so unknown fields survive a round trip
//! instead of disappearing. Construction goes through [`build`], which
//! checks the mandatory fields up front and turns a hole in the payload
//! into [`Error::MalformedResponse`] naming the entity and field.

mod message;
mod poll;
mod tweet;
mod user;

pub use message::{DirectMessage, MessageCreate, MessageData, MessageTarget};
pub use poll::{Poll, PollOption};
pub use tweet::{Tweet, TweetMetrics};
pub use user::{User, UserMetrics};

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;

/// A payload-backed model with a fixed set of mandatory fields
pub trait Entity: DeserializeOwned {
    /// Entity name used in malformed-response errors
    const KIND: &'static str;
    /// Top-level fields that must be present and non-null
    const REQUIRED_FIELDS: &'static [&'static str];
}

/// Build an entity from its payload object.
///
/// Mandatory fields are checked before deserialization so the error
/// names the first missing field rather than surfacing as a generic
/// decode failure.
pub fn build<T: Entity>(payload: JsonValue) -> Result<T> {
    let Some(object) = payload.as_object() else {
        return Err(Error::malformed(T::KIND, "<object>"));
    };
    for field in T::REQUIRED_FIELDS {
        match object.get(*field) {
            None | Some(JsonValue::Null) => return Err(Error::malformed(T::KIND, *field)),
            Some(_) => {}
        }
    }
    Ok(serde_json::from_value(payload)?)
}
