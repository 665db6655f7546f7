//! Calendar feeds: fetching, parsing, recurrence expansion and aggregation.
//!
//! - [`FeedFetcher`] - Retrieves the raw text of one feed ([`HttpFetcher`] over HTTP)
//! - [`parse_calendar`] - Turns feed text into [`RawEvent`] values
//! - [`expand_for_day`] - Finds the occurrence of a recurring event on one day
//! - [`Aggregator`] - Merges every source into today's ordered agenda
//! - [`FeedError`] - Why a single source could not contribute
//!
//! # Architecture
//!
//! ```text
//!  Source ──► FeedFetcher ──► parse_calendar ──► RawEvent
//!                                                   │
//!                        non-recurring: on target day? / recurring: expand_for_day
//!                                                   │
//!                                                   ▼
//!                                              Occurrence (+ source colour)
//!                                                   │
//!                      merge all sources ──► order ──► format ──► expired filter
//!                                                   │
//!                                                   ▼
//!                                            FormattedEvent
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dayglance_core::Source;
//! use dayglance_feeds::{Aggregator, FetchConfig, HttpFetcher};
//!
//! let aggregator = Aggregator::new(HttpFetcher::new(FetchConfig::default())?);
//! let sources = vec![Source::new("webcal://example.com/team.ics", "#3498db")];
//! let events = aggregator
//!     .aggregate_today_events(&sources, false, chrono::Local::now())
//!     .await;
//! ```

pub mod aggregate;
pub mod error;
pub mod fetch;
pub mod ics;
pub mod raw_event;
pub mod recurrence;

// Re-export main types at crate root
pub use aggregate::{
    AggregationReport, Aggregator, SourceEvents, SourceFailure, finalize, occurrences_for_day,
    order_occurrences,
};
pub use error::{FeedError, FeedErrorCode, FeedResult};
pub use fetch::{BoxFuture, FeedFetcher, FetchConfig, HttpFetcher, normalize_feed_url};
pub use ics::{ParsedCalendar, parse_calendar};
pub use raw_event::{RawEvent, Recurrence, UNTITLED_EVENT};
pub use recurrence::{Expansion, MAX_EXPANSION_STEPS, expand_for_day};
