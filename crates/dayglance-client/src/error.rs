//! Client error types.

use std::fmt;

use dayglance_core::LoggingError;
use dayglance_feeds::FeedError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// IO error.
    Io(std::io::Error),
    /// Output could not be rendered.
    Render(String),
    /// Setup of the runtime pieces (HTTP client, logging) failed.
    Runtime(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Render(msg) => write!(f, "render error: {}", msg),
            Self::Runtime(msg) => write!(f, "runtime error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<FeedError> for ClientError {
    fn from(err: FeedError) -> Self {
        Self::Runtime(err.to_string())
    }
}

impl From<LoggingError> for ClientError {
    fn from(err: LoggingError) -> Self {
        Self::Runtime(err.to_string())
    }
}
