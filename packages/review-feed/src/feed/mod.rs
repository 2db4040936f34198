//! Product feed indexing.
//!
//! Fetches the merchant product feed and turns it into the title → id
//! lookup the matcher joins against.
//!
//! # Example
//!
//! ```rust,ignore
//! use review_feed::feed::{fetch_index, FeedConfig, HttpFeedFetcher};
//!
//! let fetcher = HttpFeedFetcher::new();
//! let index = fetch_index(&fetcher, "https://shop.example/feed.xml", &FeedConfig::default()).await?;
//! ```

mod fetch;
mod parse;

pub use fetch::{FeedFetcher, HttpFeedFetcher};
pub use parse::{parse_entries, parse_index};

use crate::error::FeedResult;
use crate::types::ProductIndex;

/// Namespace merchant feeds bind their `g:`-prefixed item fields to.
pub const GOOGLE_BASE_NS: &str = "http://base.google.com/ns/1.0";

/// Feed parsing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Namespace the `title`/`id` item children must be bound to.
    pub namespace: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            namespace: GOOGLE_BASE_NS.to_string(),
        }
    }
}

impl FeedConfig {
    /// Settings for a standard merchant feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different item-field namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

/// Fetch the feed and build the product index in one step.
pub async fn fetch_index<F: FeedFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    config: &FeedConfig,
) -> FeedResult<ProductIndex> {
    let body = fetcher.fetch(url).await?;
    parse_index(&body, config)
}
