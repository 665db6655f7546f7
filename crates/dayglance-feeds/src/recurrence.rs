//! Recurrence expansion for a single day.
//!
//! Only one target day is ever shown, so a master event is expanded over a
//! short window around that day rather than from DTSTART: occurrences in the
//! window are scanned in order until one lands on the target day or the scan
//! passes it. A master event contributes at most one occurrence per day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rrule::RRuleSet;
use tracing::{debug, trace};

use dayglance_core::EventTime;

use crate::error::{FeedError, FeedResult};
use crate::raw_event::RawEvent;

/// Maximum number of occurrences collected per event and day.
pub const MAX_EXPANSION_STEPS: u16 = 1000;

/// The outcome of expanding one event for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// An occurrence lands on the target day.
    Found {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The first occurrence not before the target day is after it.
    PassedTarget,
    /// The rule ended before the target day (or the event has no rule).
    Exhausted,
    /// The step cap was hit before reaching the target day.
    LimitReached,
}

impl Expansion {
    /// Returns the occurrence span, if one was found.
    pub fn found(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Found { start, end } => Some((*start, *end)),
            _ => None,
        }
    }
}

/// Finds the occurrence of a recurring event on `target`, read in `tz`.
///
/// `overridden` lists the RECURRENCE-IDs of override events for this master;
/// they are excluded like EXDATEs so the override is not shown twice. A
/// date-only exclusion on a timed master removes that whole day.
///
/// The end of the occurrence is its start plus the master duration.
///
/// # Errors
///
/// Returns a `ParseError` if the rule cannot be parsed.
pub fn expand_for_day<Tz: TimeZone>(
    event: &RawEvent,
    target: NaiveDate,
    tz: &Tz,
    overridden: &[EventTime],
) -> FeedResult<Expansion> {
    let Some(recurrence) = &event.recurrence else {
        return Ok(Expansion::Exhausted);
    };

    let mut excluded_days = Vec::new();
    let mut excluded = Vec::new();
    for exdate in recurrence.exdates.iter().chain(overridden) {
        match exdate {
            EventTime::AllDay(day) if !event.is_all_day() => excluded_days.push(*day),
            other => excluded.push(other),
        }
    }

    let rule_text = build_rule_set(&event.start, &recurrence.rule, excluded.into_iter());
    let rule_set: RRuleSet = rule_text.parse().map_err(|e| {
        FeedError::parse(format!("invalid RRULE '{}': {}", recurrence.rule, e))
    })?;

    // Every occurrence on the target day, in any clock, falls inside this
    // window. The bounds are exclusive.
    let utc: rrule::Tz = Utc.into();
    let day_start = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc();
    let lower = day_start(target.pred_opt().unwrap_or(target)) - Duration::seconds(1);
    let upper = day_start(target.checked_add_days(chrono::Days::new(2)).unwrap_or(target));
    let lower = lower.with_timezone(&utc);
    let upper = upper.with_timezone(&utc);

    let window = rule_set
        .clone()
        .after(lower)
        .before(upper)
        .all(MAX_EXPANSION_STEPS);
    let duration = event.master_duration(tz);

    for (step, occurrence) in window.dates.iter().enumerate() {
        if excluded_days.contains(&occurrence.date_naive()) {
            trace!(title = %event.title, step, "Occurrence excluded by date");
            continue;
        }

        let start = occurrence_time(occurrence, &event.start);
        let day = start.local_date(tz);
        trace!(title = %event.title, step, day = %day, "Recurrence step");

        if day < target {
            continue;
        }
        if day > target {
            return Ok(Expansion::PassedTarget);
        }

        let start = start.to_instant(tz);
        let end = start.checked_add_signed(duration).unwrap_or(start);
        return Ok(Expansion::Found { start, end });
    }

    if window.limited || window.dates.len() >= usize::from(MAX_EXPANSION_STEPS) {
        debug!(title = %event.title, target = %target, "Expansion step limit reached");
        return Ok(Expansion::LimitReached);
    }

    // Nothing on or after the target day inside the window: tell a rule that
    // simply skips the day from one that has ended.
    if rule_set.after(upper).all(1).dates.is_empty() {
        Ok(Expansion::Exhausted)
    } else {
        Ok(Expansion::PassedTarget)
    }
}

/// Renders DTSTART, RRULE and EXDATE lines for the rule parser.
///
/// All-day starts become midnight UTC and floating starts are read as UTC, so
/// occurrences come back in the master's own clock.
fn build_rule_set<'a>(
    start: &EventTime,
    rule: &str,
    exdates: impl Iterator<Item = &'a EventTime>,
) -> String {
    let mut lines = vec![
        format!("DTSTART{}", rule_time(start)),
        format!("RRULE:{}", normalize_rule(rule)),
    ];
    lines.extend(exdates.map(|exdate| format!("EXDATE{}", rule_time(exdate))));
    lines.join("\n")
}

/// Formats a value as the `[;TZID=...]:VALUE` tail of a DTSTART/EXDATE line.
fn rule_time(time: &EventTime) -> String {
    match time {
        EventTime::AllDay(date) => format!(":{}T000000Z", date.format("%Y%m%d")),
        EventTime::DateTime(dt) => format!(":{}", dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::Floating(dt) => format!(":{}Z", dt.format("%Y%m%dT%H%M%S")),
        EventTime::Zoned { datetime, tz } => {
            format!(";TZID={}:{}", tz.name(), datetime.format("%Y%m%dT%H%M%S"))
        }
    }
}

/// Makes UNTIL acceptable to the rule parser.
///
/// A date-only UNTIL covers the whole day; a floating UNTIL is read as UTC.
fn normalize_rule(rule: &str) -> String {
    rule.trim()
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                let value = value.trim();
                if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
                    format!("{}={}T235959Z", key, value)
                } else if !value.ends_with('Z') {
                    format!("{}={}Z", key, value)
                } else {
                    part.to_string()
                }
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Converts a rule occurrence back to the master's variant.
fn occurrence_time(occurrence: &DateTime<rrule::Tz>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::AllDay(_) => EventTime::from_date(occurrence.date_naive()),
        EventTime::DateTime(_) => EventTime::from_utc(occurrence.with_timezone(&Utc)),
        EventTime::Floating(_) => EventTime::floating(occurrence.naive_utc()),
        EventTime::Zoned { tz, .. } => EventTime::zoned(occurrence.naive_local(), *tz),
    }
}
