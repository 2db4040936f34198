//! Generation pipeline - validate, fetch, match, and emit.
//!
//! The stage order is fixed: the dataset schema is checked before any
//! feed traffic, so a bad upload never costs a network round trip.

use rand::Rng;
use tracing::info;

use crate::dataset::ReviewSheet;
use crate::emitter;
use crate::error::Result;
use crate::feed::{fetch_index, FeedConfig, FeedFetcher};
use crate::matcher::{match_rows, MatchOutcome, RatingPolicy, RecordSynthesizer};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedFeed {
    /// Serialized `reviews` document, UTF-8 XML
    pub xml: Vec<u8>,

    /// Number of records in the document
    pub matched: usize,

    /// Trimmed product names with no feed entry, once per occurrence
    pub unmatched: Vec<String>,

    /// Rows dropped under [`RatingPolicy::SkipRow`]
    pub skipped_rows: usize,
}

impl GeneratedFeed {
    /// Check if every input row made it into the document.
    pub fn is_fully_matched(&self) -> bool {
        self.unmatched.is_empty() && self.skipped_rows == 0
    }
}

/// Configuration for generation runs.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Product feed location
    pub feed_url: String,

    /// Feed parsing settings
    pub feed: FeedConfig,

    /// Bad-rating handling, [`RatingPolicy::Abort`] by default
    pub rating_policy: RatingPolicy,
}

impl GenerateConfig {
    /// Create a config for a feed URL with default settings.
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            feed: FeedConfig::default(),
            rating_policy: RatingPolicy::default(),
        }
    }

    /// Set feed parsing settings.
    pub fn with_feed(mut self, feed: FeedConfig) -> Self {
        self.feed = feed;
        self
    }

    /// Set the bad-rating policy.
    pub fn with_rating_policy(mut self, policy: RatingPolicy) -> Self {
        self.rating_policy = policy;
        self
    }
}

/// Generate a review document: validate → fetch → match → emit.
pub async fn generate<F, R>(
    sheet: &ReviewSheet,
    fetcher: &F,
    synthesizer: &mut RecordSynthesizer<R>,
    config: &GenerateConfig,
) -> Result<GeneratedFeed>
where
    F: FeedFetcher,
    R: Rng,
{
    // 1. Validate and project the dataset. Fails before any feed traffic.
    let rows = sheet.review_rows()?;
    info!("Validated dataset with {} review rows", rows.len());

    // 2. Fetch the feed and build the product index.
    let index = fetch_index(fetcher, &config.feed_url, &config.feed).await?;
    info!(
        "Indexed {} products from {} via {}",
        index.len(),
        config.feed_url,
        fetcher.name()
    );

    // 3. Join rows against the index.
    let MatchOutcome {
        records,
        unmatched,
        skipped_rows,
    } = match_rows(&rows, &index, synthesizer, config.rating_policy)?;

    // 4. Serialize matched records.
    let xml = emitter::write_feed(&records)?;

    info!(
        "Generation complete: {} matched, {} unmatched, {} skipped",
        records.len(),
        unmatched.len(),
        skipped_rows
    );

    Ok(GeneratedFeed {
        xml,
        matched: records.len(),
        unmatched,
        skipped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FeedError, GenerateError};
    use crate::testing::MockFeedFetcher;
    use chrono::{TimeZone, Utc};

    const FEED_URL: &str = "https://shop.example/feed.xml";

    const FEED_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:g="http://base.google.com/ns/1.0">
  <channel>
    <item><g:title>Blue Mug</g:title><g:id>1001</g:id></item>
    <item><g:title>Red Mug</g:title><g:id>1002</g:id></item>
  </channel>
</rss>"#;

    fn sheet(rows: &[(&str, &str, &str, &str)]) -> ReviewSheet {
        ReviewSheet::new(
            vec![
                "product_name".to_string(),
                "review_content".to_string(),
                "rating".to_string(),
                "reviewer".to_string(),
            ],
            rows.iter()
                .map(|(p, c, r, n)| {
                    vec![p.to_string(), c.to_string(), r.to_string(), n.to_string()]
                })
                .collect(),
        )
    }

    fn seeded_synthesizer() -> RecordSynthesizer {
        RecordSynthesizer::seeded(42, Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_generate_basic() {
        let fetcher = MockFeedFetcher::new().with_feed(FEED_URL, FEED_BODY);
        let sheet = sheet(&[("Blue Mug", "Great mug!", "5", "Ana")]);
        let mut synthesizer = seeded_synthesizer();

        let feed = generate(&sheet, &fetcher, &mut synthesizer, &GenerateConfig::new(FEED_URL))
            .await
            .unwrap();

        assert_eq!(feed.matched, 1);
        assert!(feed.is_fully_matched());
        assert_eq!(fetcher.fetch_call_count(), 1);

        let xml = String::from_utf8(feed.xml).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<product_id>1001</product_id>"));
        assert!(xml.contains("<name>Ana</name>"));
    }

    #[tokio::test]
    async fn test_schema_failure_never_touches_the_feed() {
        let fetcher = MockFeedFetcher::new().with_feed(FEED_URL, FEED_BODY);
        let sheet = ReviewSheet::new(
            vec!["product_name".to_string(), "reviewer".to_string()],
            vec![vec!["Blue Mug".to_string(), "Ana".to_string()]],
        );
        let mut synthesizer = seeded_synthesizer();

        let result = generate(&sheet, &fetcher, &mut synthesizer, &GenerateConfig::new(FEED_URL)).await;

        match result {
            Err(GenerateError::MissingColumns { missing }) => {
                assert_eq!(missing, ["review_content", "rating"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
        assert_eq!(fetcher.fetch_call_count(), 0);
    }

    #[tokio::test]
    async fn test_unmatched_rows_are_diagnostics_not_errors() {
        let fetcher = MockFeedFetcher::new().with_feed(FEED_URL, FEED_BODY);
        let sheet = sheet(&[
            ("Green Mug", "Nice", "4", "Ana"),
            ("Blue Mug", "Great", "5", "Omar"),
        ]);
        let mut synthesizer = seeded_synthesizer();

        let feed = generate(&sheet, &fetcher, &mut synthesizer, &GenerateConfig::new(FEED_URL))
            .await
            .unwrap();

        assert_eq!(feed.matched, 1);
        assert_eq!(feed.unmatched, ["Green Mug"]);
        assert!(!feed.is_fully_matched());
    }

    #[tokio::test]
    async fn test_feed_http_error_propagates() {
        let fetcher = MockFeedFetcher::new().with_status(FEED_URL, 503);
        let sheet = sheet(&[("Blue Mug", "Great", "5", "Ana")]);
        let mut synthesizer = seeded_synthesizer();

        let result = generate(&sheet, &fetcher, &mut synthesizer, &GenerateConfig::new(FEED_URL)).await;

        match result {
            Err(GenerateError::Feed(FeedError::Http { status, .. })) => assert_eq!(status, 503),
            other => panic!("expected Feed(Http), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_feed_propagates_as_parse_error() {
        let fetcher = MockFeedFetcher::new().with_feed(FEED_URL, "<rss><item></wrong>");
        let sheet = sheet(&[("Blue Mug", "Great", "5", "Ana")]);
        let mut synthesizer = seeded_synthesizer();

        let result = generate(&sheet, &fetcher, &mut synthesizer, &GenerateConfig::new(FEED_URL)).await;

        assert!(matches!(result, Err(GenerateError::Feed(FeedError::Parse(_)))));
    }

    #[tokio::test]
    async fn test_rating_policy_flows_through_config() {
        let fetcher = MockFeedFetcher::new().with_feed(FEED_URL, FEED_BODY);
        let sheet = sheet(&[
            ("Blue Mug", "Great", "five", "Ana"),
            ("Red Mug", "Good", "4", "Omar"),
        ]);

        let mut synthesizer = seeded_synthesizer();
        let abort = generate(&sheet, &fetcher, &mut synthesizer, &GenerateConfig::new(FEED_URL)).await;
        assert!(matches!(abort, Err(GenerateError::InvalidRating { row: 1, .. })));

        let mut synthesizer = seeded_synthesizer();
        let config = GenerateConfig::new(FEED_URL).with_rating_policy(RatingPolicy::SkipRow);
        let feed = generate(&sheet, &fetcher, &mut synthesizer, &config).await.unwrap();

        assert_eq!(feed.matched, 1);
        assert_eq!(feed.skipped_rows, 1);
        assert!(!feed.is_fully_matched());
    }
}
