//! Paginated list fetching.
//!
//! NetBox list endpoints answer either with a page envelope
//! (`{"count", "next", "previous", "results"}`) or, for a few custom
//! endpoints, with a bare JSON list. [`Pager`] hides both shapes behind a
//! single item-at-a-time cursor.
//!
//! # Sequential and parallel fetching
//!
//! By default the pager follows `next` links lazily, fetching a page only
//! when the buffered items of the previous one are used up.
//!
//! When threading is enabled in the [`NetboxConfig`](crate::NetboxConfig)
//! and the first page reports a `count` together with a `next` link, every
//! remaining page is requested by `offset` at once, with at most
//! `max_workers` requests in flight. Pages are re-sequenced by offset before
//! their items are handed out, so callers see server order either way.
//!
//! A caller-supplied `offset` always yields a single page.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;

use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};

/// A lazy cursor over the items of a paginated list response.
#[derive(Debug)]
pub struct Pager {
    client: Option<Arc<HttpClient>>,
    path: String,
    query: Vec<(String, String)>,
    buffer: VecDeque<Value>,
    next_url: Option<String>,
    started: bool,
    count: Option<u64>,
}

impl Pager {
    /// Creates a pager for `path` with the given filter parameters.
    ///
    /// Nothing is fetched until the first item or the count is requested.
    /// When the configuration sets a page size and the query has no `limit`,
    /// the page size is sent as `limit`.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        let mut query = query;
        if let Some(size) = client.config().page_size() {
            if !query.iter().any(|(k, _)| k == "limit") {
                query.push(("limit".to_string(), size.to_string()));
            }
        }

        Self {
            client: Some(client),
            path: path.into(),
            query,
            buffer: VecDeque::new(),
            next_url: None,
            started: false,
            count: None,
        }
    }

    /// Creates a pager over items that are already in memory.
    #[must_use]
    pub fn from_items(items: Vec<Value>) -> Self {
        Self {
            client: None,
            path: String::new(),
            query: Vec::new(),
            count: Some(items.len() as u64),
            buffer: items.into(),
            next_url: None,
            started: true,
        }
    }

    /// Returns the next item, fetching another page when the buffer is empty.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if a page request fails or the response is
    /// neither a list nor a page envelope.
    pub async fn next_item(&mut self) -> Result<Option<Value>, HttpError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if !self.started {
                self.fetch_first_page().await?;
                continue;
            }
            match self.next_url.take() {
                Some(url) => self.fetch_next_page(url).await?,
                None => return Ok(None),
            }
        }
    }

    /// Returns the total number of items the server reported.
    ///
    /// Fetches the first page if needed; its items stay buffered. Returns
    /// `None` only when the server sent no count.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the first page request fails.
    pub async fn count(&mut self) -> Result<Option<u64>, HttpError> {
        if !self.started {
            self.fetch_first_page().await?;
        }
        Ok(self.count)
    }

    /// Returns the count learned so far without fetching.
    #[must_use]
    pub const fn known_count(&self) -> Option<u64> {
        self.count
    }

    fn client(&self) -> Result<&Arc<HttpClient>, HttpError> {
        self.client.as_ref().ok_or_else(|| HttpError::Content {
            message: "pager has no client to fetch further pages".to_string(),
        })
    }

    async fn fetch_first_page(&mut self) -> Result<(), HttpError> {
        self.started = true;
        let client = Arc::clone(self.client()?);

        let body = get_json(&client, &self.path, self.query.clone()).await?;
        let page = Page::parse(body)?;

        self.count = page.count.or_else(|| {
            if page.next.is_none() {
                Some(page.results.len() as u64)
            } else {
                None
            }
        });
        let page_len = page.results.len();
        self.buffer.extend(page.results);

        let explicit_offset = self.query.iter().any(|(k, _)| k == "offset");
        if explicit_offset {
            return Ok(());
        }

        match (page.next, page.count) {
            (Some(_), Some(count)) if client.config().threading() && page_len > 0 => {
                self.fetch_remaining_parallel(&client, page_len, count).await
            }
            (next, _) => {
                self.next_url = next;
                Ok(())
            }
        }
    }

    async fn fetch_next_page(&mut self, url: String) -> Result<(), HttpError> {
        let client = Arc::clone(self.client()?);

        // The `next` link already carries every query parameter.
        let body = get_json(&client, &url, Vec::new()).await?;
        let page = Page::parse(body)?;

        self.buffer.extend(page.results);
        self.next_url = page.next;
        Ok(())
    }

    async fn fetch_remaining_parallel(
        &mut self,
        client: &Arc<HttpClient>,
        page_size: usize,
        count: u64,
    ) -> Result<(), HttpError> {
        let page_size_u64 = page_size as u64;
        let offsets: Vec<u64> = (1..)
            .map(|page| page * page_size_u64)
            .take_while(|offset| *offset < count)
            .collect();

        let base_query: Vec<(String, String)> = self
            .query
            .iter()
            .filter(|(k, _)| k != "limit" && k != "offset")
            .cloned()
            .collect();
        let workers = client.config().max_workers();

        tracing::debug!(
            path = %self.path,
            pages = offsets.len(),
            workers,
            "Fetching remaining pages in parallel"
        );

        let path = self.path.as_str();
        let pages: Vec<Vec<Value>> = stream::iter(offsets)
            .map(|offset| {
                let mut query = base_query.clone();
                query.push(("limit".to_string(), page_size.to_string()));
                query.push(("offset".to_string(), offset.to_string()));
                async move {
                    let body = get_json(client, path, query).await?;
                    Ok::<_, HttpError>(Page::parse(body)?.results)
                }
            })
            .buffered(workers)
            .try_collect()
            .await?;

        for results in pages {
            self.buffer.extend(results);
        }
        Ok(())
    }
}

/// One parsed page of a list response.
#[derive(Debug)]
struct Page {
    count: Option<u64>,
    next: Option<String>,
    results: Vec<Value>,
}

impl Page {
    fn parse(body: Value) -> Result<Self, HttpError> {
        match body {
            Value::Array(results) => Ok(Self {
                count: None,
                next: None,
                results,
            }),
            Value::Object(mut map) => {
                let results = match map.remove("results") {
                    Some(Value::Array(results)) => results,
                    _ => {
                        return Err(HttpError::Content {
                            message: "expected a list or an object with 'results'".to_string(),
                        })
                    }
                };
                Ok(Self {
                    count: map.get("count").and_then(Value::as_u64),
                    next: map
                        .get("next")
                        .and_then(Value::as_str)
                        .map(String::from),
                    results,
                })
            }
            _ => Err(HttpError::Content {
                message: "expected a list or an object with 'results'".to_string(),
            }),
        }
    }
}

async fn get_json(
    client: &HttpClient,
    path: &str,
    query: Vec<(String, String)>,
) -> Result<Value, HttpError> {
    let request = HttpRequest::builder(HttpMethod::Get, path)
        .query(query)
        .build()?;
    Ok(client.request(request).await?.body)
}
