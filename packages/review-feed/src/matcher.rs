//! Review matching.
//!
//! Joins projected review rows against the product index and synthesizes
//! the output-only fields (review id, timestamp) for every hit. Rows whose
//! product has no feed entry are collected as diagnostics, not errors.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{GenerateError, Result};
use crate::types::{ProductIndex, ReviewRecord, ReviewRow};

/// Timestamp layout of synthesized reviews: second precision, no offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Upper bound (inclusive) on the synthesized review age, in days.
const MAX_REVIEW_AGE_DAYS: i64 = 60;

/// What a rating cell that cannot be coerced to an integer means for
/// the run.
///
/// `Abort` fails the whole batch on the first bad cell. `SkipRow` drops
/// the offending row and keeps going; dropped rows are counted in
/// [`MatchOutcome::skipped_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingPolicy {
    #[default]
    Abort,
    SkipRow,
}

/// Source of synthesized record fields.
///
/// Production callers use [`RecordSynthesizer::new`]; tests pin a seed and
/// an instant with [`RecordSynthesizer::seeded`] so generated ids and
/// timestamps are reproducible.
pub struct RecordSynthesizer<R: Rng = StdRng> {
    rng: R,
    now: DateTime<Utc>,
}

impl RecordSynthesizer<StdRng> {
    /// Entropy-seeded synthesizer anchored at the current instant.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            now: Utc::now(),
        }
    }

    /// Deterministic synthesizer for tests and reproducible runs.
    pub fn seeded(seed: u64, now: DateTime<Utc>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            now,
        }
    }
}

impl Default for RecordSynthesizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RecordSynthesizer<R> {
    /// Synthesizer over a caller-provided RNG.
    pub fn with_rng(rng: R, now: DateTime<Utc>) -> Self {
        Self { rng, now }
    }

    /// Instant the synthesized timestamps count back from.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Fresh v4 UUID drawn from the RNG.
    pub fn review_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
    }

    /// Instant up to sixty days before `now`, at second precision.
    pub fn review_timestamp(&mut self) -> String {
        let days_ago = self.rng.gen_range(0..=MAX_REVIEW_AGE_DAYS);
        (self.now - Duration::days(days_ago))
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// Everything the matcher hands back: records for the emitter plus
/// diagnostics for the host.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Synthesized records, in input row order
    pub records: Vec<ReviewRecord>,
    /// Trimmed product names with no feed entry, once per occurrence
    pub unmatched: Vec<String>,
    /// Rows dropped under [`RatingPolicy::SkipRow`]
    pub skipped_rows: usize,
}

/// Join review rows against the product index.
///
/// Product names are trimmed before lookup. Hits synthesize one record
/// each; misses land in [`MatchOutcome::unmatched`]. Bad rating cells go
/// through `policy`.
pub fn match_rows<R: Rng>(
    rows: &[ReviewRow],
    index: &ProductIndex,
    synthesizer: &mut RecordSynthesizer<R>,
    policy: RatingPolicy,
) -> Result<MatchOutcome> {
    let mut outcome = MatchOutcome::default();

    for row in rows {
        let product_name = row.product_name.trim();

        let Some(product_id) = index.resolve(product_name) else {
            debug!(row = row.row, product = %product_name, "no feed entry for product");
            outcome.unmatched.push(product_name.to_string());
            continue;
        };

        let review_rating = match coerce_rating(&row.rating) {
            Some(rating) => rating,
            None => match policy {
                RatingPolicy::Abort => {
                    return Err(GenerateError::InvalidRating {
                        row: row.row,
                        value: row.rating.clone(),
                    });
                }
                RatingPolicy::SkipRow => {
                    warn!(row = row.row, value = %row.rating, "skipping row with bad rating");
                    outcome.skipped_rows += 1;
                    continue;
                }
            },
        };

        outcome.records.push(ReviewRecord {
            review_id: synthesizer.review_id(),
            reviewer: row.reviewer.clone(),
            review_timestamp: synthesizer.review_timestamp(),
            title: String::new(),
            content: row.review_content.clone(),
            review_rating,
            product_id: product_id.to_string(),
        });
    }

    Ok(outcome)
}

/// Coerce a rating cell to an integer.
///
/// Integer text parses directly. Float text truncates toward zero, since
/// workbook numeric cells surface as floats. Anything else fails.
fn coerce_rating(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();

    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}
