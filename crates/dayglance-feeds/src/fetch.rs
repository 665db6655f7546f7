//! Feed retrieval.
//!
//! [`FeedFetcher`] is the seam between the aggregator and the network. The
//! production implementation is [`HttpFetcher`], a plain HTTP GET via reqwest;
//! tests substitute an in-memory fetcher.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{FeedError, FeedResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so fetchers can be swapped at
/// runtime.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves the raw text body of a calendar feed.
pub trait FeedFetcher: Send + Sync {
    /// Fetches the feed at `url` and returns its body.
    ///
    /// # Errors
    ///
    /// Returns a fetch-class [`FeedError`] on transport failures and
    /// non-success statuses.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>>;
}

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl FetchConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("dayglance/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Validates a feed URL and rewrites `webcal://` to `https://`.
///
/// # Errors
///
/// Returns an `InvalidUrl` error for unparsable URLs and schemes other than
/// `http`, `https` and `webcal`.
pub fn normalize_feed_url(raw: &str) -> FeedResult<Url> {
    let trimmed = raw.trim();
    let rewritten = match trimmed.get(..9) {
        Some(prefix) if prefix.eq_ignore_ascii_case("webcal://") => {
            format!("https://{}", &trimmed[9..])
        }
        _ => trimmed.to_string(),
    };

    let url = Url::parse(&rewritten).map_err(|e| {
        FeedError::invalid_url(format!("cannot parse URL: {}", e))
            .with_url(trimmed)
            .with_source(e)
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FeedError::invalid_url(format!("unsupported scheme '{}'", other)).with_url(trimmed)),
    }
}

/// Maps a non-success HTTP status to a feed error.
///
/// Returns `None` for 2xx statuses.
pub fn status_error(status: StatusCode) -> Option<FeedError> {
    if status.is_success() {
        return None;
    }

    let err = match status {
        StatusCode::NOT_FOUND => FeedError::not_found("calendar feed not found"),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FeedError::access_denied(format!("access denied ({})", status))
        }
        StatusCode::TOO_MANY_REQUESTS => FeedError::rate_limited("too many requests to server"),
        s if s.is_server_error() => FeedError::server(format!("server error ({})", s)),
        s => FeedError::unexpected_status(format!("unexpected status {}", s)),
    };
    Some(err)
}

/// Fetches feeds over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FeedError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get(&self, raw_url: &str) -> FeedResult<String> {
        let url = normalize_feed_url(raw_url)?;
        trace!(url = %url, "Sending request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(e, raw_url))?;

        let status = response.status();
        debug!(url = %url, status = %status, "Received response");

        if let Some(err) = status_error(status) {
            warn!(url = %url, status = %status, "Feed request failed");
            return Err(err.with_url(raw_url));
        }

        response.text().await.map_err(|e| transport_error(e, raw_url))
    }
}

impl FeedFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
        Box::pin(self.get(url))
    }
}

fn transport_error(e: reqwest::Error, url: &str) -> FeedError {
    let err = if e.is_timeout() {
        FeedError::timeout(format!("request timed out: {}", e))
    } else {
        FeedError::network(format!("request failed: {}", e))
    };
    err.with_url(url).with_source(e)
}
