//! Core types: time, occurrences, conference links, formatting

pub mod event;
pub mod format;
pub mod links;
pub mod logging;
pub mod time;

pub use event::{ConferenceLink, FormattedEvent, MeetingPlatform, Occurrence, Source};
pub use format::{
    ellipsis, format_event_time, format_occurrence, guest_label, make_hyperlink, FormatOptions,
    OutputFormat, OutputFormatter, ALL_DAY_LABEL,
};
pub use links::{extract_conference_link, LinkDetector};
pub use logging::{init_logging, LogSettings, LoggingError};
pub use time::{localize, EventTime, TimeWindow};
