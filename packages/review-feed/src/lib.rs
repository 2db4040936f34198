//! Merchant Review Feed Generation Library
//!
//! Turns a spreadsheet of product reviews into the review XML document a
//! merchant platform ingests, by joining each row against the product feed
//! the shop already publishes.
//!
//! The run is a single pass: the dataset schema is validated, the product
//! feed is fetched and indexed by title, review rows are matched against
//! the index, and matched records are serialized. Rows whose product is
//! missing from the feed are reported, never silently dropped into the
//! output.
//!
//! # Usage
//!
//! ```rust,ignore
//! use review_feed::{generate, GenerateConfig, HttpFeedFetcher, RecordSynthesizer};
//!
//! let sheet = review_feed::read_path("reviews.xlsx".as_ref())?;
//! let fetcher = HttpFeedFetcher::new();
//! let mut synthesizer = RecordSynthesizer::new();
//!
//! let config = GenerateConfig::new("https://shop.example/feed.xml");
//! let feed = generate(&sheet, &fetcher, &mut synthesizer, &config).await?;
//!
//! std::fs::write(review_feed::FEED_FILENAME, &feed.xml)?;
//! for product in &feed.unmatched {
//!     eprintln!("not in feed: {product}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`dataset`] - Review sheet readers (CSV, workbooks)
//! - [`feed`] - Product feed fetching and indexing
//! - [`matcher`] - Row/index join and record synthesis
//! - [`emitter`] - Output document serialization
//! - [`pipeline`] - End-to-end orchestration
//! - [`testing`] - Mock fetcher for tests

pub mod dataset;
pub mod emitter;
pub mod error;
pub mod feed;
pub mod matcher;
pub mod pipeline;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{DatasetError, FeedError, GenerateError, Result};
pub use types::{ProductFeedEntry, ProductIndex, ReviewRecord, ReviewRow, REQUIRED_COLUMNS};

// Re-export dataset readers
pub use dataset::{read_csv, read_path, read_xlsx, ReviewSheet};

// Re-export feed components
pub use feed::{
    fetch_index, parse_entries, parse_index, FeedConfig, FeedFetcher, HttpFeedFetcher,
    GOOGLE_BASE_NS,
};

// Re-export matcher components
pub use matcher::{match_rows, MatchOutcome, RatingPolicy, RecordSynthesizer};

// Re-export emitter components
pub use emitter::{write_feed, FEED_FILENAME, FEED_MIME_TYPE};

// Re-export pipeline entry points
pub use pipeline::{generate, GenerateConfig, GeneratedFeed};

// Re-export testing utilities
pub use testing::MockFeedFetcher;
