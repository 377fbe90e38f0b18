//! Authentication: credential storage, OAuth1 signing, and the
//! three-legged authorization handshake.

mod session;
mod types;

pub use session::{OauthEndpoints, OauthSession};
pub use types::{AuthorizationRequest, Credentials};

#[cfg(test)]
mod tests;
