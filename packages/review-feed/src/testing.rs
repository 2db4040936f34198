//! Testing utilities.
//!
//! Provides a configurable mock implementation of the [`FeedFetcher`]
//! trait, so pipeline behavior can be exercised without network access.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{FeedError, FeedResult};
use crate::feed::FeedFetcher;

/// Canned response for one URL.
enum CannedResponse {
    Body(Vec<u8>),
    Status(u16),
    Transport(String),
}

/// Mock feed fetcher for testing.
///
/// Returns canned bodies per URL and records every fetch. URLs with no
/// canned response answer with HTTP 404.
///
/// # Example
///
/// ```rust,ignore
/// use review_feed::testing::MockFeedFetcher;
///
/// let fetcher = MockFeedFetcher::new().with_feed("https://shop.example/feed.xml", "<rss/>");
/// let body = fetcher.fetch("https://shop.example/feed.xml").await?;
/// assert_eq!(fetcher.fetch_call_count(), 1);
/// ```
#[derive(Default)]
pub struct MockFeedFetcher {
    /// Canned responses indexed by URL
    responses: Arc<RwLock<HashMap<String, CannedResponse>>>,
    /// Track fetched URLs for verification
    fetch_calls: Arc<RwLock<Vec<String>>>,
}

impl MockFeedFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feed body for a URL.
    pub fn add_feed(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        let mut responses = self.responses.write().unwrap();
        responses.insert(url.into(), CannedResponse::Body(body.into()));
    }

    /// Add a feed body for a URL (builder pattern).
    pub fn with_feed(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.add_feed(url, body);
        self
    }

    /// Answer a URL with an HTTP status instead of a body (builder pattern).
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), CannedResponse::Status(status));
        self
    }

    /// Answer a URL with a transport failure (builder pattern).
    pub fn with_transport_error(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), CannedResponse::Transport(message.into()));
        self
    }

    /// Get the number of times fetch was called.
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.read().unwrap().len()
    }

    /// Get the URLs that were fetched, in call order.
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.read().unwrap().clone()
    }

    /// Clear all recorded calls.
    pub fn reset_calls(&self) {
        self.fetch_calls.write().unwrap().clear();
    }

    /// Clear all responses and calls.
    pub fn reset(&self) {
        self.responses.write().unwrap().clear();
        self.reset_calls();
    }
}

impl Clone for MockFeedFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            fetch_calls: Arc::clone(&self.fetch_calls),
        }
    }
}

#[async_trait]
impl FeedFetcher for MockFeedFetcher {
    async fn fetch(&self, url: &str) -> FeedResult<Vec<u8>> {
        self.fetch_calls.write().unwrap().push(url.to_string());

        let responses = self.responses.read().unwrap();
        match responses.get(url) {
            Some(CannedResponse::Body(body)) => Ok(body.clone()),
            Some(CannedResponse::Status(status)) => Err(FeedError::Http {
                status: *status,
                url: url.to_string(),
            }),
            Some(CannedResponse::Transport(message)) => Err(FeedError::Transport(Box::new(
                std::io::Error::new(std::io::ErrorKind::Other, message.clone()),
            ))),
            None => Err(FeedError::Http {
                status: 404,
                url: url.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
