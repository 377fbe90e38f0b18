//! # Perch
//!
//! A minimal, Rust-native client for the Twitter REST API (v2) and the
//! v1.1 Account Activity (webhook) API.
//!
//! ## Features
//!
//! - **Typed models**: users, tweets, direct messages, polls — unknown
//!   fields are preserved, never rejected
//! - **OAuth1 + Bearer auth**: HMAC-SHA1 request signing and the full
//!   three-legged authorization flow
//! - **Cursor pagination**: lazy page fetching with a never-refetch cache
//!   and forward/backward navigation
//! - **Account Activity webhooks**: CRC challenge answering, payload
//!   signature verification, ordered event handler dispatch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use perch::{Client, Credentials, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let credentials = Credentials::oauth1("ck", "cs", "at", "ats")
//!         .with_bearer("AAAA...");
//!     let client = Client::new(credentials)?;
//!
//!     let user = client.fetch_user_by_username("jack").await?;
//!     let mut followers = client.followers(&user.id);
//!     let page = followers.next_page().await?;
//!     println!("{} followers on page 1", page.items.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Client                              │
//! │  fetch_user / fetch_tweet / post_tweet / followers / ...     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬───────────┬──────┴───────┬─────────────┬─────────┐
//! │   Auth   │   HTTP    │  Pagination  │   Webhook   │ Models  │
//! ├──────────┼───────────┼──────────────┼─────────────┼─────────┤
//! │ OAuth1   │ GET/POST  │ Cursor pages │ CRC answer  │ User    │
//! │ Bearer   │ 4xx/429/  │ Page cache   │ Signature   │ Tweet   │
//! │ 3-legged │ 5xx map   │ Fwd/backward │ Dispatch    │ Message │
//! └──────────┴───────────┴──────────────┴─────────────┴─────────┘
//! ```
//!
//! No retries, no backoff, no internal timers: every failed call surfaces
//! immediately to the caller, and rate-limit handling is the caller's
//! decision (see `Error::RateLimited`).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credentials and OAuth1 session handling
pub mod auth;

/// HTTP transport with status-class error mapping
pub mod http;

/// Cursor pagination over list endpoints
pub mod pagination;

/// Account Activity webhook subscription management
pub mod webhook;

/// Typed API entities and the model mapper
pub mod models;

/// Line-delimited tweet streaming
pub mod stream;

mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{AuthorizationRequest, Credentials, OauthEndpoints, OauthSession};
pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use models::{DirectMessage, Poll, Tweet, User};
pub use pagination::{Cursor, Page};
pub use stream::TweetStream;
pub use webhook::{ActivityEvent, EventKind, SubscriptionManager, SubscriptionState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
