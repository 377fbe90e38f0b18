//! HTTP transport: request building, authentication strategy selection,
//! and status-code-to-error mapping.

mod client;

pub use client::{AuthStrategy, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
