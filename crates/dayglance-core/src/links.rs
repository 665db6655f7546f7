//! Conference link detection in event text.
//!
//! Event feeds rarely carry structured conference data, so meeting links are
//! recovered from the free-text description and location. A URL here is
//! anything starting with `http://` or `https://` up to the next whitespace;
//! no further URI validation is done.
//!
//! # Example
//!
//! ```
//! use dayglance_core::links::extract_conference_link;
//!
//! let link = extract_conference_link(
//!     "join at https://example.com/x and https://zoom.us/y",
//!     "",
//! );
//! assert_eq!(link.unwrap().url, "https://zoom.us/y");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::event::{ConferenceLink, MeetingPlatform};

/// Regex for extracting URLs from text.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("Invalid URL regex"));

/// Conference link detector.
#[derive(Debug, Default)]
pub struct LinkDetector;

impl LinkDetector {
    /// Creates a new link detector.
    pub fn new() -> Self {
        Self
    }

    /// Extracts all URLs from the given text, in order of appearance.
    pub fn extract_urls<'a>(&self, text: &'a str) -> Vec<&'a str> {
        URL_REGEX.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Returns the first URL pointing at a known meeting platform.
    ///
    /// Description URLs are considered before location URLs; within that
    /// combined list the first platform match wins. Generic URLs are never
    /// returned.
    pub fn find_conference_link(&self, description: &str, location: &str) -> Option<ConferenceLink> {
        self.extract_urls(description)
            .into_iter()
            .chain(self.extract_urls(location))
            .find_map(|url| {
                MeetingPlatform::detect(url).map(|platform| ConferenceLink::new(platform, url))
            })
    }
}

/// Convenience function to find a conference link in event text.
///
/// See [`LinkDetector::find_conference_link`] for details.
pub fn extract_conference_link(description: &str, location: &str) -> Option<ConferenceLink> {
    LinkDetector::new().find_conference_link(description, location)
}
