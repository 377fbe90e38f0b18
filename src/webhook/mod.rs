//! Account-activity webhooks: CRC challenges, delivery signature
//! verification, event decoding, and subscription lifecycle management.

mod events;
mod manager;
mod signature;

pub use events::{parse_events, ActivityEvent, EventKind};
pub use manager::{Subscription, SubscriptionList, SubscriptionManager, SubscriptionState, WebhookInfo};
pub use signature::{crc_response_token, verify_payload};
