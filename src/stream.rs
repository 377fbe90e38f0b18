//! Sampled tweet stream
//!
//! The sample stream delivers newline-delimited JSON over a single
//! long-lived response. Bytes are buffered until a full line arrives;
//! blank keep-alive lines are skipped. The stream ends when the server
//! closes the connection.

use crate::error::Result;
use crate::http::{AuthStrategy, HttpClient, RequestConfig};
use crate::models::{build, Tweet};
use crate::types::JsonValue;
use std::time::Duration;
use tracing::debug;

const STREAM_ENDPOINT: &str = "/2/tweets/sample/stream";
const TWEET_FIELDS: &str = "author_id,created_at,lang,possibly_sensitive,public_metrics";

// the connection stays open far past the client default timeout
const STREAM_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// A connected sample stream
pub struct TweetStream {
    response: reqwest::Response,
    buffer: Vec<u8>,
}

impl TweetStream {
    pub(crate) async fn connect(http: &HttpClient) -> Result<Self> {
        let response = http
            .get(
                STREAM_ENDPOINT,
                RequestConfig::new()
                    .query("tweet.fields", TWEET_FIELDS)
                    .timeout(STREAM_TIMEOUT)
                    .auth(AuthStrategy::Bearer),
            )
            .await?;
        debug!("sample stream connected");
        Ok(Self {
            response,
            buffer: Vec::new(),
        })
    }

    /// The next tweet, or `None` once the server closes the stream.
    pub async fn next_tweet(&mut self) -> Result<Option<Tweet>> {
        loop {
            while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=newline).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(tweet) = parse_stream_line(&line)? {
                    return Ok(Some(tweet));
                }
            }
            match self.response.chunk().await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None => return Ok(None),
            }
        }
    }
}

impl std::fmt::Debug for TweetStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweetStream")
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// Decode one stream line; blank keep-alives decode to `None`.
fn parse_stream_line(line: &str) -> Result<Option<Tweet>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut envelope: JsonValue = serde_json::from_str(line)?;
    let data = envelope
        .get_mut("data")
        .map(JsonValue::take)
        .unwrap_or(JsonValue::Null);
    if data.is_null() {
        // error or system frames carry no data object
        debug!(frame = %line, "skipping non-data stream frame");
        return Ok(None);
    }
    build(data).map(Some)
}
