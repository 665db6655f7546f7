//! iCalendar (RFC 5545) parsing.
//!
//! This module turns the body of a feed into [`RawEvent`] values using the
//! `icalendar` crate's parser. Times are kept in the clock the feed declared
//! (UTC, named zone, floating or bare date) and only resolved to instants by
//! the aggregator.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::parser::{Component, Property, read_calendar, unfold};
use tracing::debug;

use dayglance_core::EventTime;

use crate::error::{FeedError, FeedResult};
use crate::raw_event::{RawEvent, Recurrence, UNTITLED_EVENT};

/// The events of one feed.
#[derive(Debug, Clone, Default)]
pub struct ParsedCalendar {
    /// X-WR-CALNAME, if the feed names itself.
    pub name: Option<String>,
    /// Every usable VEVENT, in document order.
    pub events: Vec<RawEvent>,
}

/// Parses a feed body.
///
/// A VEVENT without a usable DTSTART is skipped; it does not fail the feed.
///
/// # Errors
///
/// Returns a `ParseError` if the text is not an iCalendar document.
pub fn parse_calendar(text: &str) -> FeedResult<ParsedCalendar> {
    if !text.contains("BEGIN:VCALENDAR") {
        return Err(FeedError::parse("no VCALENDAR found"));
    }

    let unfolded = unfold(text);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| FeedError::parse(format!("malformed calendar: {}", e)))?;

    let name = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-CALNAME")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|name| !name.is_empty());

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(parse_event)
        .collect();

    Ok(ParsedCalendar { name, events })
}

fn parse_event(vevent: &Component<'_>) -> Option<RawEvent> {
    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());

    let Some(start) = vevent.find_prop("DTSTART").and_then(parse_time_property) else {
        debug!(uid = ?uid, "Skipping VEVENT without a usable DTSTART");
        return None;
    };

    let title = text_prop(vevent, "SUMMARY")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_EVENT.to_string());

    let mut raw = RawEvent::new(title, start)
        .with_location(text_prop(vevent, "LOCATION").unwrap_or_default())
        .with_description(text_prop(vevent, "DESCRIPTION").unwrap_or_default());
    raw.uid = uid;
    raw.end = vevent.find_prop("DTEND").and_then(parse_time_property);
    raw.duration = vevent
        .find_prop("DURATION")
        .and_then(|p| parse_duration(p.val.as_ref()));

    if let Some(rule) = vevent.find_prop("RRULE") {
        let exdates = vevent
            .properties
            .iter()
            .filter(|p| p.name == "EXDATE")
            .flat_map(parse_time_list)
            .collect();
        raw.recurrence = Some(Recurrence {
            rule: rule.val.to_string(),
            exdates,
        });
    }

    raw.recurrence_id = vevent
        .find_prop("RECURRENCE-ID")
        .and_then(parse_time_property);
    raw.is_cancelled = vevent
        .find_prop("STATUS")
        .is_some_and(|p| {
            let status: &str = p.val.as_ref();
            status.eq_ignore_ascii_case("CANCELLED")
        });
    raw.attendee_count = vevent
        .properties
        .iter()
        .filter(|p| p.name == "ATTENDEE")
        .count();

    debug!(
        uid = ?raw.uid,
        title = %raw.title,
        start = ?raw.start,
        recurring = raw.is_recurring(),
        "Parsed event"
    );

    Some(raw)
}

fn text_prop(component: &Component<'_>, name: &str) -> Option<String> {
    component
        .find_prop(name)
        .map(|p| unescape_text(p.val.as_ref()))
}

fn param<'a>(prop: &'a Property<'_>, key: &str) -> Option<&'a str> {
    prop.params
        .iter()
        .find(|p| {
            let name: &str = p.key.as_ref();
            name.eq_ignore_ascii_case(key)
        })
        .and_then(|p| p.val.as_ref())
        .map(|v| {
            let value: &str = v.as_ref();
            value.trim_matches('"')
        })
}

/// Parses a single-valued date/date-time property (DTSTART, DTEND, RECURRENCE-ID).
fn parse_time_property(prop: &Property<'_>) -> Option<EventTime> {
    parse_time_list(prop).into_iter().next()
}

/// Parses a possibly comma-separated date/date-time property (EXDATE).
fn parse_time_list(prop: &Property<'_>) -> Vec<EventTime> {
    let tzid = param(prop, "TZID");
    let is_date = param(prop, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"));

    let values: &str = prop.val.as_ref();
    values
        .split(',')
        .filter_map(|value| parse_time_value(value.trim(), tzid, is_date))
        .collect()
}

/// Resolves one date or date-time value.
///
/// - `VALUE=DATE` or an 8-digit value is a bare date (all-day).
/// - A trailing `Z` is UTC.
/// - A `TZID` naming a known IANA zone is zoned; anything else is floating.
pub fn parse_time_value(value: &str, tzid: Option<&str>, is_date: bool) -> Option<EventTime> {
    if value.is_empty() {
        return None;
    }

    if is_date || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())) {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(EventTime::from_date);
    }

    if let Some(stamp) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(stamp, "%Y%m%dT%H%M%S")
            .ok()
            .map(|dt| EventTime::from_utc(dt.and_utc()));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    match tzid.and_then(|id| id.parse::<chrono_tz::Tz>().ok()) {
        Some(tz) => Some(EventTime::zoned(naive, tz)),
        None => {
            if let Some(id) = tzid {
                debug!(tzid = %id, "Unknown TZID, treating time as floating");
            }
            Some(EventTime::floating(naive))
        }
    }
}

/// Parses an RFC 5545 DURATION value such as `PT1H30M` or `-P1D`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, body) = if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else {
        (false, value.strip_prefix('+').unwrap_or(value))
    };

    let parsed = iso8601::duration(body).ok()?;
    let std_duration: std::time::Duration = parsed.into();
    let duration = Duration::from_std(std_duration).ok()?;
    Some(if negative { -duration } else { duration })
}

/// Reverses RFC 5545 TEXT escaping (`\n`, `\N`, `\,`, `\;`, `\\`).
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
