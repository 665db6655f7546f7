//! Display formatting for the daily agenda.
//!
//! This module turns [`Occurrence`] values into [`FormattedEvent`] values
//! (time label, expiry flag, flattened conference link) and renders a list of
//! formatted events for the terminal.
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use dayglance_core::format::format_time_range;
//!
//! let start = Utc.with_ymd_and_hms(2025, 2, 5, 9, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2025, 2, 5, 13, 30, 0).unwrap();
//! assert_eq!(format_time_range(start, end, &Utc), "9.00 am - 1.30 pm");
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{FormattedEvent, Occurrence};


/// Label shown instead of a time range for all-day events.
pub const ALL_DAY_LABEL: &str = "All day";

/// Header printed above a non-empty agenda.
pub const AGENDA_HEADER: &str = "Today's Schedule";

/// Width of the time column in terminal output ("12.00 pm - 12.00 pm").
const TIME_COLUMN_WIDTH: usize = 19;

/// The output format for agenda display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Configuration options for terminal rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Whether to emit OSC8 hyperlinks for meeting links.
    pub hyperlinks: bool,
    /// Whether to emit ANSI colours (calendar tag, dimmed expired events).
    pub colors: bool,
    /// Maximum length for event titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Text printed when there are no events.
    pub no_events_text: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            hyperlinks: true,
            colors: true,
            max_title_length: None,
            no_events_text: "No events scheduled for today".to_string(),
        }
    }
}

/// Formats one instant as a 12-hour clock label, e.g. `9.05 am`.
pub fn format_clock<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    let local = instant.with_timezone(tz);
    let (is_pm, hour) = local.hour12();
    let meridiem = if is_pm { "pm" } else { "am" };
    format!("{}.{:02} {}", hour, local.minute(), meridiem)
}

/// Formats a start/end pair, e.g. `11.30 am - 1.00 pm`.
///
/// Start and end carry their own meridiem even when they share one.
pub fn format_time_range<Tz: TimeZone>(start: DateTime<Utc>, end: DateTime<Utc>, tz: &Tz) -> String {
    format!("{} - {}", format_clock(start, tz), format_clock(end, tz))
}

/// Returns the time label for an occurrence.
pub fn format_event_time<Tz: TimeZone>(occurrence: &Occurrence, tz: &Tz) -> String {
    if occurrence.is_all_day {
        ALL_DAY_LABEL.to_string()
    } else {
        format_time_range(occurrence.start, occurrence.end, tz)
    }
}

/// Projects an occurrence to its display form as seen at `now`.
pub fn format_occurrence<Tz: TimeZone>(
    occurrence: &Occurrence,
    now: DateTime<Utc>,
    tz: &Tz,
) -> FormattedEvent {
    let conference_link = occurrence
        .conference_link
        .as_ref()
        .map(|link| link.url.clone())
        .unwrap_or_default();

    FormattedEvent {
        title: occurrence.title.clone(),
        time: format_event_time(occurrence, tz),
        location: occurrence.location.clone(),
        has_conference_link: !conference_link.is_empty(),
        conference_link,
        attendee_count: occurrence.attendee_count,
        is_all_day: occurrence.is_all_day,
        calendar_color: occurrence.calendar_color.clone(),
        is_expired: occurrence.is_expired_at(now),
        starts_at: occurrence.start,
    }
}

/// Returns `"1 guest"` / `"N guests"`, or `None` when nobody is invited.
pub fn guest_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 guest".to_string()),
        n => Some(format!("{} guests", n)),
    }
}

/// Terminal renderer for formatted events.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a new formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Returns the formatter options.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Renders the agenda for a terminal.
    ///
    /// An empty list renders as the configured "no events" text.
    pub fn format_tty(&self, events: &[FormattedEvent]) -> String {
        if events.is_empty() {
            return self.options.no_events_text.clone();
        }

        let mut out = String::from(AGENDA_HEADER);
        for event in events {
            out.push('\n');
            out.push_str(&self.format_line(event));
        }
        out
    }

    fn format_line(&self, event: &FormattedEvent) -> String {
        let mut line = format!(
            "{} {:<width$}  {}",
            self.calendar_marker(&event.calendar_color),
            event.time,
            self.truncate_title(&event.title),
            width = TIME_COLUMN_WIDTH
        );

        if let Some(label) = guest_label(event.attendee_count) {
            let _ = write!(line, "  ({})", label);
        }

        if event.has_conference_link {
            if self.options.hyperlinks {
                let _ = write!(
                    line,
                    "  [{}]",
                    make_hyperlink(&event.conference_link, "Join Meeting")
                );
            } else {
                let _ = write!(line, "  [Join Meeting: {}]", event.conference_link);
            }
        }

        if event.is_expired {
            if self.options.colors {
                line = format!("\x1b[2m{}\x1b[22m", line);
            } else {
                line.push_str("  (ended)");
            }
        }

        line
    }

    fn calendar_marker(&self, color: &str) -> String {
        match parse_hex_color(color) {
            Some((r, g, b)) if self.options.colors => {
                format!("\x1b[38;2;{};{};{}m●\x1b[39m", r, g, b)
            }
            _ => "•".to_string(),
        }
    }

    fn truncate_title<'a>(&self, title: &'a str) -> Cow<'a, str> {
        match self.options.max_title_length {
            Some(max) => ellipsis(title, max),
            None => Cow::Borrowed(title),
        }
    }
}

/// Parses a `#rrggbb` colour token.
fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Creates an OSC8 hyperlink for terminal output.
///
/// This creates an ANSI escape sequence that modern terminals interpret as a clickable link.
pub fn make_hyperlink(url: &str, label: &str) -> String {
    // OSC8 hyperlink format: \e]8;;URL\e\\LABEL\e]8;;\e\\
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}
