//! Typed errors for the review feed library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while generating a review feed.
///
/// Any variant means no output document was produced.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Required columns are absent from the review dataset
    #[error("dataset is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Reading the review dataset failed
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Fetching or parsing the product feed failed
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// A rating cell could not be coerced to an integer
    #[error("row {row}: rating {value:?} is not a number")]
    InvalidRating { row: usize, value: String },

    /// Serializing the output document failed
    #[error("emit error: {0}")]
    Emit(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur while fetching or parsing the product feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Feed URL is not a fetchable http(s) URL
    #[error("invalid feed URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failed before a response arrived
    #[error("feed request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("feed request returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// Feed body is not well-formed XML
    #[error("feed parse error: {0}")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur while reading a review dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook decoding failed
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Workbook has no worksheet to read
    #[error("workbook has no worksheet")]
    NoWorksheet,

    /// File extension maps to no supported reader
    #[error("unsupported dataset format: {extension:?}")]
    UnsupportedFormat { extension: String },
}

/// Result type alias for feed generation.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Result type alias for feed operations.
pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Result type alias for dataset operations.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;
