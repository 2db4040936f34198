//! Core domain types shared across the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Columns every review dataset must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 4] = ["product_name", "review_content", "rating", "reviewer"];

/// One `title`/`id` pair pulled out of the product feed.
///
/// Entries only live while the index is being built; the pipeline never
/// holds on to them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFeedEntry {
    /// Product title, whitespace-trimmed
    pub title: String,
    /// Product id, whitespace-trimmed
    pub id: String,
}

/// Lookup table from product title to product id.
///
/// Built once per run from the feed and read-only afterwards. Keys and
/// values are stored trimmed; inserting a title that already exists
/// replaces the previous id.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    entries: HashMap<String, String>,
}

impl ProductIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a title/id pair, trimming both sides.
    ///
    /// Returns the id previously stored under the same trimmed title, if any.
    pub fn insert(&mut self, title: &str, id: &str) -> Option<String> {
        self.entries
            .insert(title.trim().to_string(), id.trim().to_string())
    }

    /// Resolve a product name to its feed id. The name is trimmed before
    /// lookup; comparison is exact and case-sensitive.
    pub fn resolve(&self, product_name: &str) -> Option<&str> {
        self.entries.get(product_name.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (title, id) pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, i)| (t.as_str(), i.as_str()))
    }
}

/// One review row projected out of the uploaded dataset.
///
/// The rating stays raw text here; coercion happens during matching so the
/// configured policy can decide what a bad cell means for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRow {
    /// 1-based data row position (header excluded), for diagnostics
    pub row: usize,
    /// Product name to match against the feed index
    pub product_name: String,
    /// Free-text review body
    pub review_content: String,
    /// Raw rating cell
    pub rating: String,
    /// Reviewer display name
    pub reviewer: String,
}

/// A fully synthesized review, ready for serialization.
///
/// Built one-to-one from matched rows and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Freshly generated v4 UUID
    pub review_id: String,
    /// Reviewer display name, verbatim from the row
    pub reviewer: String,
    /// `YYYY-MM-DDTHH:MM:SS`, no timezone offset
    pub review_timestamp: String,
    /// Reserved, always empty
    pub title: String,
    /// Review body, verbatim from the row
    pub content: String,
    /// Coerced integer rating
    pub review_rating: i64,
    /// Product id resolved from the feed, never empty
    pub product_id: String,
}
