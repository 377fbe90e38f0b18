//! Bidirectional cursor over a paginated endpoint
//!
//! Fetched pages land in an append-only cache keyed by 1-based page
//! number. Moving forward past the cache issues one request with the
//! last page's `pagination_token`; moving backward only ever replays the
//! cache. Crossing a boundary with no page available fails with
//! [`Error::NoPageAvailable`] and leaves the position where it was.

use crate::error::{Error, Result};
use crate::http::{AuthStrategy, HttpClient, RequestConfig};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// One cached page of results
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// 1-based page number
    pub number: usize,
    /// Decoded items; empty when the server returned no data
    pub items: Vec<T>,
    /// Token for the page after this one
    pub next_token: Option<String>,
    /// Token for the page before this one
    pub previous_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageResponse<T> {
    // a fn-path default keeps the derive from demanding T: Default
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    next_token: Option<String>,
    previous_token: Option<String>,
}

/// Stateful cursor over a paginated collection endpoint
#[derive(Debug)]
pub struct Cursor<T> {
    http: HttpClient,
    endpoint: String,
    params: BTreeMap<String, String>,
    auth: AuthStrategy,
    pages: Vec<Page<T>>,
    // 0 = before the first fetch; otherwise the 1-based current page
    position: usize,
}

impl<T: DeserializeOwned> Cursor<T> {
    /// Create a cursor over an endpoint with fixed query parameters
    pub fn new(http: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
            auth: AuthStrategy::Bearer,
            pages: Vec::new(),
            position: 0,
        }
    }

    /// Add a query parameter applied to every page fetch
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Override the authentication strategy for page fetches
    #[must_use]
    pub fn auth(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }

    /// The page the cursor currently points at, if any has been fetched
    pub fn current_page(&self) -> Option<&Page<T>> {
        self.position
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
    }

    /// Current 1-based position; 0 before the first page is fetched
    pub fn position(&self) -> usize {
        self.position
    }

    /// Every page fetched so far, in page-number order
    pub fn visited_pages(&self) -> &[Page<T>] {
        &self.pages
    }

    /// Advance to the next page.
    ///
    /// Serves from the cache when the page was already fetched, otherwise
    /// issues exactly one request. Fails with [`Error::NoPageAvailable`]
    /// when the collection is exhausted; the position does not move.
    pub async fn next_page(&mut self) -> Result<&Page<T>> {
        // Replay a page we already hold
        if self.position < self.pages.len() {
            self.position += 1;
            return Ok(&self.pages[self.position - 1]);
        }

        let token = match self.pages.last() {
            None => None,
            Some(last) => match &last.next_token {
                Some(token) => Some(token.clone()),
                None => return Err(Error::NoPageAvailable),
            },
        };

        let page = self.fetch_page(token).await?;
        self.pages.push(page);
        self.position = self.pages.len();
        Ok(&self.pages[self.position - 1])
    }

    /// Step back to the previous page.
    ///
    /// Always served from the cache. Fails with
    /// [`Error::NoPageAvailable`] at the first page; the position does
    /// not move.
    pub fn previous_page(&mut self) -> Result<&Page<T>> {
        if self.position <= 1 {
            return Err(Error::NoPageAvailable);
        }
        self.position -= 1;
        Ok(&self.pages[self.position - 1])
    }

    async fn fetch_page(&self, token: Option<String>) -> Result<Page<T>> {
        let mut config = RequestConfig::new().auth(self.auth);
        for (k, v) in &self.params {
            config = config.query(k.clone(), v.clone());
        }
        config = config.query_opt("pagination_token", token);

        let response: PageResponse<T> = self.http.get_json(&self.endpoint, config).await?;
        let number = self.pages.len() + 1;
        debug!(
            endpoint = %self.endpoint,
            page = number,
            items = response.data.len(),
            "fetched page"
        );

        Ok(Page {
            number,
            items: response.data,
            next_token: response.meta.next_token,
            previous_token: response.meta.previous_token,
        })
    }
}
