//! HMAC-SHA256 webhook signatures
//!
//! Covers both directions of the scheme: answering a CRC challenge, and
//! checking the `x-twitter-webhooks-signature` header on inbound
//! deliveries. The consumer secret is the shared key for both.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the response token for a CRC challenge.
///
/// The value is `sha256=` followed by the base64 HMAC-SHA256 of the
/// challenge token, keyed with the consumer secret. The same inputs
/// always produce the same token.
pub fn crc_response_token(consumer_secret: &str, crc_token: &str) -> String {
    format!("{SIGNATURE_PREFIX}{}", hmac_base64(consumer_secret, crc_token.as_bytes()))
}

/// Check a delivery body against its signature header.
///
/// Returns `false` for a missing prefix, undecodable base64, or a
/// digest mismatch. Comparison is constant-time.
pub fn verify_payload(consumer_secret: &str, payload: &[u8], signature_header: &str) -> bool {
    let Some(encoded) = signature_header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(claimed) = STANDARD.decode(encoded) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(consumer_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    constant_time_eq(&claimed, &expected)
}

fn hmac_base64(key: &str, message: &[u8]) -> String {
    // HMAC accepts keys of any length, new_from_slice cannot fail
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).unwrap_or_else(|_| unreachable!());
    mac.update(message);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Compare two byte slices without early exit on mismatch
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
