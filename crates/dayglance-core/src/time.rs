//! Time types for calendar events.
//!
//! This module provides [`EventTime`] for representing event start/end values
//! as they appear in a feed (a UTC stamp, a zoned or floating wall-clock time,
//! or a bare all-day date), and [`TimeWindow`] for the local day being shown.
//!
//! Wall-clock values only become absolute instants once an evaluation zone is
//! known, so every conversion takes the zone explicitly.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Represents a start or end value of a calendar event.
///
/// Calendar feeds carry four kinds of temporal values:
/// - **DateTime**: a UTC timestamp (`20250205T100000Z`)
/// - **Zoned**: a wall-clock time tied to an IANA zone (`TZID=Europe/Paris`)
/// - **Floating**: a wall-clock time with no zone, read in the viewer's zone
/// - **AllDay**: a bare date with no time-of-day component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant, stored in UTC.
    DateTime(DateTime<Utc>),
    /// A wall-clock time in a known zone.
    Zoned {
        /// Local wall-clock time in `tz`.
        datetime: NaiveDateTime,
        /// The zone the wall-clock time belongs to.
        tz: chrono_tz::Tz,
    },
    /// A wall-clock time interpreted in the evaluation zone.
    Floating(NaiveDateTime),
    /// An all-day date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Creates a new `EventTime::DateTime` from a UTC datetime.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Creates a new `EventTime::Floating` from a wall-clock time.
    pub fn floating(datetime: NaiveDateTime) -> Self {
        Self::Floating(datetime)
    }

    /// Creates a new `EventTime::Zoned` from a wall-clock time and its zone.
    pub fn zoned(datetime: NaiveDateTime, tz: chrono_tz::Tz) -> Self {
        Self::Zoned { datetime, tz }
    }

    /// Returns `true` if this is an all-day value.
    ///
    /// This is decided purely by the variant, never by any duration.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Resolves this value to an absolute instant.
    ///
    /// All-day dates resolve to local midnight in `tz`; floating times are
    /// read as wall-clock times in `tz`.
    pub fn to_instant<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::Zoned { datetime, tz: zone } => localize(zone, *datetime),
            Self::Floating(datetime) => localize(tz, *datetime),
            Self::AllDay(date) => localize(tz, date.and_time(NaiveTime::MIN)),
        }
    }

    /// Returns the calendar day of this value in `tz`.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        match self {
            Self::AllDay(date) => *date,
            _ => self.to_instant(tz).with_timezone(tz).date_naive(),
        }
    }

}

/// Maps a wall-clock time in `tz` to a UTC instant without panicking.
///
/// Ambiguous times (DST fall-back) take the earliest mapping. Times inside a
/// spring-forward gap are moved forward by one hour.
pub fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(Duration::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// A time window for the day being displayed.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a time window for a single day in the given timezone.
    ///
    /// The window runs from local midnight to the next local midnight, so it
    /// is 23 or 25 hours long on DST transition days.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let start = localize(tz, date.and_time(NaiveTime::MIN));
        let end = date
            .succ_opt()
            .map(|next| localize(tz, next.and_time(NaiveTime::MIN)))
            .unwrap_or(start + Duration::days(1));
        Self { start, end }
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}
