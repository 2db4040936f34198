//! Product feed fetching over HTTP.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FeedError, FeedResult};

/// Collaborator that retrieves the raw product feed document.
///
/// The pipeline depends on this trait rather than on a concrete HTTP
/// client, so tests can swap in a canned fetcher and hosts can bring
/// their own transport.
///
/// # Example
///
/// ```rust,ignore
/// use review_feed::feed::{FeedFetcher, HttpFeedFetcher};
///
/// let fetcher = HttpFeedFetcher::new();
/// let body = fetcher.fetch("https://shop.example/feed.xml").await?;
/// ```
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch the feed body from `url`.
    ///
    /// No retries; any transport failure is final for the run.
    async fn fetch(&self, url: &str) -> FeedResult<Vec<u8>>;

    /// Fetcher name for logging and debugging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Feed fetcher backed by `reqwest`.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFeedFetcher {
    /// Create a fetcher with a 30 second request timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: "ReviewFeedBot/1.0".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Reject anything that is not a plain http(s) URL before a request
    /// goes out.
    fn validate_url(url: &str) -> FeedResult<Url> {
        let parsed = Url::parse(url).map_err(|e| FeedError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(FeedError::InvalidUrl {
                url: url.to_string(),
                reason: format!("disallowed scheme {scheme:?}"),
            }),
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> FeedResult<Vec<u8>> {
        let parsed = Self::validate_url(url)?;
        debug!(url = %parsed, "feed fetch starting");

        let response = self
            .client
            .get(parsed.clone())
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %parsed, error = %e, "feed request failed");
                FeedError::Transport(Box::new(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
                url: parsed.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(Box::new(e)))?;

        debug!(url = %parsed, bytes = body.len(), "feed fetched");
        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}
