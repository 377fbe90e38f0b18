//! Credential types
//!
//! [`Credentials`] is immutable once constructed and owned exclusively by
//! the [`super::OauthSession`] (or cloned into it). There is no ambient
//! credential state anywhere in the crate.

use crate::types::OptionStringExt;

/// The credential set supplied at construction.
///
/// A bearer token alone is enough for app-only calls; the full consumer
/// key/secret + access token/secret quadruple is required for
/// user-context (OAuth1) calls.
#[derive(Clone, Default)]
pub struct Credentials {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    access_token: Option<String>,
    access_token_secret: Option<String>,
    bearer_token: Option<String>,
}

impl Credentials {
    /// Create app-only credentials from a bearer token
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: token.into().none_if_empty(),
            ..Self::default()
        }
    }

    /// Create user-context credentials from the OAuth1 quadruple
    pub fn oauth1(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into().none_if_empty(),
            consumer_secret: consumer_secret.into().none_if_empty(),
            access_token: access_token.into().none_if_empty(),
            access_token_secret: access_token_secret.into().none_if_empty(),
            bearer_token: None,
        }
    }

    /// Consumer-only credentials, the starting point for the three-legged
    /// handshake (no user access tokens yet).
    pub fn consumer(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into().none_if_empty(),
            consumer_secret: consumer_secret.into().none_if_empty(),
            ..Self::default()
        }
    }

    /// Attach a bearer token
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = token.into().none_if_empty();
        self
    }

    /// Attach an access token/secret pair, returning a new credential set.
    ///
    /// Used by `complete_handshake` to produce the permanent credentials;
    /// the original set is untouched.
    #[must_use]
    pub fn with_access_tokens(
        mut self,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        self.access_token = access_token.into().none_if_empty();
        self.access_token_secret = access_token_secret.into().none_if_empty();
        self
    }

    /// The consumer key, if configured
    pub fn consumer_key(&self) -> Option<&str> {
        self.consumer_key.as_deref()
    }

    /// The consumer secret, if configured
    pub fn consumer_secret(&self) -> Option<&str> {
        self.consumer_secret.as_deref()
    }

    /// The user access token, if configured
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The user access token secret, if configured
    pub fn access_token_secret(&self) -> Option<&str> {
        self.access_token_secret.as_deref()
    }

    /// The bearer token, if configured
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Whether the full OAuth1 quadruple is present
    pub fn has_user_context(&self) -> bool {
        self.consumer_key.is_some()
            && self.consumer_secret.is_some()
            && self.access_token.is_some()
            && self.access_token_secret.is_some()
    }

    /// Whether the consumer key/secret pair is present
    pub fn has_consumer_pair(&self) -> bool {
        self.consumer_key.is_some() && self.consumer_secret.is_some()
    }

    /// Whether a bearer token is present
    pub fn has_bearer(&self) -> bool {
        self.bearer_token.is_some()
    }
}

// Secrets never reach log output, only which slots are filled.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("has_consumer_pair", &self.has_consumer_pair())
            .field("has_user_context", &self.has_user_context())
            .field("has_bearer", &self.has_bearer())
            .finish()
    }
}

/// One attempt at the three-legged authorization handshake.
///
/// Created by `begin_handshake`, consumed by `complete_handshake` (or
/// abandoned once the remote service expires the temporary token).
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// The temporary request token
    pub request_token: String,
    /// The temporary request token secret
    pub request_token_secret: String,
    /// URL the user must visit to authorize the application
    pub authorization_url: String,
    /// Callback URL the user is redirected to after authorizing
    pub callback_url: String,
    /// Whether the remote service confirmed the callback URL
    pub callback_confirmed: bool,
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_bearer_only() {
        let creds = Credentials::bearer("AAAA");
        assert!(creds.has_bearer());
        assert!(!creds.has_user_context());
        assert!(!creds.has_consumer_pair());
        assert_eq!(creds.bearer_token(), Some("AAAA"));
    }

    #[test]
    fn test_oauth1_quadruple() {
        let creds = Credentials::oauth1("ck", "cs", "at", "ats");
        assert!(creds.has_user_context());
        assert!(creds.has_consumer_pair());
        assert!(!creds.has_bearer());
        assert_eq!(creds.access_token_secret(), Some("ats"));
    }

    #[test]
    fn test_consumer_with_access_tokens() {
        let creds = Credentials::consumer("ck", "cs");
        assert!(!creds.has_user_context());

        let creds = creds.with_access_tokens("at", "ats");
        assert!(creds.has_user_context());
    }

    #[test]
    fn test_empty_strings_are_missing() {
        let creds = Credentials::oauth1("ck", "cs", "", "");
        assert!(!creds.has_user_context());
        assert!(creds.has_consumer_pair());
    }
}
