//! Error types for perch
//!
//! This module defines the error taxonomy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Nothing is retried internally: a rate-limit response surfaces as
//! [`Error::RateLimited`] with the remote retry-after value attached, and
//! the decision to wait belongs to the caller.

use thiserror::Error;

/// The main error type for perch
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Authentication Errors
    // ============================================================================
    /// Credential problems: missing tokens, rejected handshakes, bad signatures on our side
    #[error("Authentication failed: {message}")]
    Auth {
        /// What went wrong
        message: String,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// A 4xx response other than 429
    #[error("HTTP {status}: {message}")]
    ClientError {
        /// The HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// A 429 response; the caller decides whether and when to retry
    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// The server's retry-after hint, 0 when absent
        retry_after_seconds: u64,
    },

    /// A 5xx response
    #[error("Server error {status}: {message}")]
    ServerError {
        /// The HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// Transport-level failure from the HTTP stack
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL that could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Mapping Errors
    // ============================================================================
    /// A 2xx payload that lacks a field the model requires
    #[error("Malformed {entity} response: missing required field '{field}'")]
    MalformedResponse {
        /// The entity being mapped
        entity: String,
        /// The missing field
        field: String,
    },

    /// A body that is not valid JSON at all
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Webhook Errors
    // ============================================================================
    /// A webhook delivery whose signature header did not verify
    #[error("Webhook payload signature verification failed")]
    InvalidSignature,

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// A cursor move past either end of the collection
    #[error("No page available in that direction")]
    NoPageAvailable,
}

impl Error {
    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MalformedResponse {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Map an HTTP status with an extracted error message to the taxonomy.
    ///
    /// 429 becomes [`Error::RateLimited`] (use [`Error::rate_limited`] to
    /// attach the retry-after value), other 4xx become
    /// [`Error::ClientError`], and 5xx become [`Error::ServerError`].
    ///
    /// Callers only reach this for error statuses; anything outside
    /// 400..=599 is classified as a server error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        debug_assert!(
            (400..=599).contains(&status),
            "non-error status {status} mapped to an error"
        );
        match status {
            429 => Self::RateLimited {
                retry_after_seconds: 0,
            },
            400..=499 => Self::ClientError {
                status,
                message: message.into(),
            },
            // the debug_assert above rejects anything below 400
            _ => Self::ServerError {
                status,
                message: message.into(),
            },
        }
    }

    /// Create a rate-limit error carrying the remote retry-after value
    pub fn rate_limited(retry_after_seconds: u64) -> Self {
        Self::RateLimited {
            retry_after_seconds,
        }
    }

    /// Check if this error is a rate-limit response
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The remote-specified retry-after value, if this is a rate-limit error
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_seconds,
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

/// Result type alias for perch
pub type Result<T> = std::result::Result<T, Error>;
