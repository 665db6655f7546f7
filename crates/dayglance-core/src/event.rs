//! Event types for the daily agenda.
//!
//! This module provides the core types flowing through an aggregation pass:
//! - [`Source`]: One calendar feed and its display colour
//! - [`MeetingPlatform`] / [`ConferenceLink`]: A detected meeting-join URL
//! - [`Occurrence`]: One event projected onto the displayed day
//! - [`FormattedEvent`]: The display-ready result handed to a presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One calendar feed to aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// The feed URL (`https://`, `http://` or `webcal://`).
    pub url: String,
    /// Colour token used to tag every event from this feed.
    pub color: String,
}

impl Source {
    /// Creates a new source.
    pub fn new(url: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            color: color.into(),
        }
    }

    /// Returns true if the URL is empty or whitespace.
    ///
    /// Blank sources are skipped without attempting a fetch.
    pub fn is_blank(&self) -> bool {
        self.url.trim().is_empty()
    }
}

/// A known video conferencing platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPlatform {
    Zoom,
    GoogleMeet,
    Teams,
    Webex,
}

impl MeetingPlatform {
    /// All platforms, in detection order.
    pub const ALL: [MeetingPlatform; 4] = [
        MeetingPlatform::Zoom,
        MeetingPlatform::GoogleMeet,
        MeetingPlatform::Teams,
        MeetingPlatform::Webex,
    ];

    /// The domain substring identifying this platform in a URL.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Zoom => "zoom.us",
            Self::GoogleMeet => "meet.google.com",
            Self::Teams => "teams.microsoft.com",
            Self::Webex => "webex.com",
        }
    }

    /// Returns the platform whose domain appears in `url`, if any.
    pub fn detect(url: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| url.contains(p.domain()))
    }
}

/// A meeting-join URL found in an event's text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceLink {
    /// The platform the URL belongs to.
    pub platform: MeetingPlatform,
    /// The URL exactly as it appeared in the text.
    pub url: String,
}

impl ConferenceLink {
    /// Creates a new conference link.
    pub fn new(platform: MeetingPlatform, url: impl Into<String>) -> Self {
        Self {
            platform,
            url: url.into(),
        }
    }
}

/// One event projected onto the displayed day.
///
/// Either a non-recurring event whose start falls on the day, or the single
/// expansion of a recurring event that lands on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// The event title ("Untitled Event" when the feed had none).
    pub title: String,
    /// Absolute start instant.
    pub start: DateTime<Utc>,
    /// Absolute end instant (equal to `start` for zero-length events).
    pub end: DateTime<Utc>,
    /// Whether the source value was a bare date.
    pub is_all_day: bool,
    /// The location text, empty when absent.
    pub location: String,
    /// The description text, empty when absent.
    pub description: String,
    /// Meeting link detected in description or location.
    pub conference_link: Option<ConferenceLink>,
    /// Number of ATTENDEE entries on the event.
    pub attendee_count: usize,
    /// Colour of the source this occurrence came from.
    pub calendar_color: String,
}

impl Occurrence {
    /// Creates a new occurrence with required fields.
    pub fn new(
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        is_all_day: bool,
    ) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            is_all_day,
            location: String::new(),
            description: String::new(),
            conference_link: None,
            attendee_count: 0,
            calendar_color: String::new(),
        }
    }

    /// Returns true if the occurrence is over at `now`.
    ///
    /// All-day occurrences span the whole day and never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_all_day && self.end < now
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the conference link.
    pub fn with_conference_link(mut self, link: Option<ConferenceLink>) -> Self {
        self.conference_link = link;
        self
    }

    /// Builder method to set the attendee count.
    pub fn with_attendee_count(mut self, count: usize) -> Self {
        self.attendee_count = count;
        self
    }

    /// Builder method to tag with a source colour.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.calendar_color = color.into();
        self
    }
}

/// A display-ready event.
///
/// This is the output contract of an aggregation pass. It is derived from an
/// [`Occurrence`] at a given instant and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedEvent {
    pub title: String,
    /// "All day" or "9.00 am - 10.00 am".
    pub time: String,
    pub location: String,
    pub has_conference_link: bool,
    /// The meeting URL, or an empty string.
    pub conference_link: String,
    pub attendee_count: usize,
    pub is_all_day: bool,
    pub calendar_color: String,
    pub is_expired: bool,
    /// Start instant, kept so consumers can re-check ordering.
    pub starts_at: DateTime<Utc>,
}
