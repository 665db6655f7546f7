//! Error types for feed operations.
//!
//! A [`FeedError`] describes why one calendar feed could not contribute to an
//! aggregation pass. Feed errors never abort the pass; the aggregator logs them
//! and carries on with the remaining sources.

use std::fmt;
use thiserror::Error;

/// The category of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorCode {
    /// Connection failed, DNS resolution failed, body could not be read, etc.
    NetworkError,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The server answered 404.
    NotFound,
    /// The server answered 401 or 403.
    AccessDenied,
    /// The server answered 429.
    RateLimited,
    /// The server answered with a 5xx status.
    ServerError,
    /// Any other non-success status.
    UnexpectedStatus,
    /// The source URL could not be parsed or uses an unsupported scheme.
    InvalidUrl,
    /// The body is not a usable iCalendar document.
    ParseError,
}

impl FeedErrorCode {
    /// Returns true if the error happened while retrieving the feed.
    pub fn is_fetch(&self) -> bool {
        !self.is_parse()
    }

    /// Returns true if the feed was retrieved but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::ParseError)
    }

    /// Returns a short machine-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::UnexpectedStatus => "unexpected_status",
            Self::InvalidUrl => "invalid_url",
            Self::ParseError => "parse_error",
        }
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that prevented one feed from contributing events.
#[derive(Debug, Error)]
pub struct FeedError {
    code: FeedErrorCode,
    message: String,
    /// The feed URL, when known.
    url: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeedError {
    /// Creates a new feed error with the given code and message.
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            url: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::NetworkError, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Timeout, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::NotFound, message)
    }

    /// Creates an access denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::AccessDenied, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::ServerError, message)
    }

    /// Creates an unexpected status error.
    pub fn unexpected_status(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::UnexpectedStatus, message)
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InvalidUrl, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::ParseError, message)
    }

    /// Sets the feed URL for this error.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FeedErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the feed URL, if set.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns true if the error happened while retrieving the feed.
    pub fn is_fetch(&self) -> bool {
        self.code.is_fetch()
    }

    /// Returns true if the feed body could not be parsed.
    pub fn is_parse(&self) -> bool {
        self.code.is_parse()
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref url) = self.url {
            write!(f, "[{}] ", url)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_and_parse_split() {
        assert!(FeedErrorCode::NotFound.is_fetch());
        assert!(FeedErrorCode::Timeout.is_fetch());
        assert!(!FeedErrorCode::NotFound.is_parse());
        assert!(FeedErrorCode::ParseError.is_parse());
        assert!(!FeedErrorCode::ParseError.is_fetch());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(FeedErrorCode::AccessDenied.as_str(), "access_denied");
        assert_eq!(FeedErrorCode::UnexpectedStatus.to_string(), "unexpected_status");
    }

    #[test]
    fn feed_error_creation() {
        let err = FeedError::not_found("HTTP 404");
        assert_eq!(err.code(), FeedErrorCode::NotFound);
        assert_eq!(err.message(), "HTTP 404");
        assert!(err.url().is_none());
    }

    #[test]
    fn feed_error_display() {
        let err = FeedError::rate_limited("slow down").with_url("https://example.com/a.ics");
        assert_eq!(
            err.to_string(),
            "[https://example.com/a.ics] rate_limited: slow down"
        );
        assert_eq!(FeedError::parse("no VCALENDAR").to_string(), "parse_error: no VCALENDAR");
    }

    #[test]
    fn feed_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("reset by peer");
        let err = FeedError::network("read failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
