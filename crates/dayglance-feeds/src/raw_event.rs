//! Raw event type produced by the calendar parser.
//!
//! A [`RawEvent`] keeps every VEVENT field the aggregation pass needs, in the
//! clock the feed declared. It is turned into one [`Occurrence`] per displayed
//! day by the aggregator (directly or via the recurrence expander).

use chrono::{DateTime, Duration, TimeZone, Utc};

use dayglance_core::{EventTime, Occurrence, extract_conference_link};

/// Title used when a VEVENT has no SUMMARY.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// The repetition rule of a master event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    /// The RRULE value, without the `RRULE:` prefix.
    pub rule: String,
    /// Excluded occurrence starts (EXDATE).
    pub exdates: Vec<EventTime>,
}

impl Recurrence {
    /// Creates a recurrence with no exclusions.
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            exdates: Vec::new(),
        }
    }

    /// Builder method to add an excluded start.
    pub fn with_exdate(mut self, exdate: EventTime) -> Self {
        self.exdates.push(exdate);
        self
    }
}

/// One VEVENT as parsed from a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// The UID, used to pair overrides with their master.
    pub uid: Option<String>,

    /// The title ([`UNTITLED_EVENT`] when absent).
    pub title: String,

    /// When the event starts.
    pub start: EventTime,

    /// When the event ends (DTEND), if given.
    pub end: Option<EventTime>,

    /// DURATION, if given.
    pub duration: Option<Duration>,

    /// The location text, empty when absent.
    pub location: String,

    /// The description text, empty when absent.
    pub description: String,

    /// The repetition rule, for master events.
    pub recurrence: Option<Recurrence>,

    /// RECURRENCE-ID, for overrides of one occurrence of a master.
    pub recurrence_id: Option<EventTime>,

    /// Number of ATTENDEE entries.
    pub attendee_count: usize,

    /// Whether STATUS is CANCELLED.
    pub is_cancelled: bool,
}

impl RawEvent {
    /// Creates a new raw event with the given title and start.
    pub fn new(title: impl Into<String>, start: EventTime) -> Self {
        Self {
            uid: None,
            title: title.into(),
            start,
            end: None,
            duration: None,
            location: String::new(),
            description: String::new(),
            recurrence: None,
            recurrence_id: None,
            attendee_count: 0,
            is_cancelled: false,
        }
    }

    /// Returns true if the start is a bare date.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Returns true if this is a master event with a repetition rule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// The length every occurrence of this event spans.
    ///
    /// DURATION wins over DTEND; without either the event has zero length.
    /// Never negative.
    pub fn master_duration<Tz: TimeZone>(&self, tz: &Tz) -> Duration {
        let length = match (self.duration, &self.end) {
            (Some(duration), _) => duration,
            (None, Some(end)) => end.to_instant(tz) - self.start.to_instant(tz),
            (None, None) => Duration::zero(),
        };
        length.max(Duration::zero())
    }

    /// Absolute start and end of the event itself (not of an expansion).
    ///
    /// End resolves to DTEND, else start + DURATION, else start. An end that
    /// precedes the start is clamped to the start.
    pub fn span<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start.to_instant(tz);
        let end = match (&self.end, self.duration) {
            (Some(end), _) => end.to_instant(tz),
            (None, Some(duration)) => start + duration,
            (None, None) => start,
        };
        (start, end.max(start))
    }

    /// Projects the event onto one day with the given instants.
    pub fn to_occurrence(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Occurrence {
        Occurrence::new(self.title.clone(), start, end, self.is_all_day())
            .with_location(self.location.clone())
            .with_description(self.description.clone())
            .with_conference_link(extract_conference_link(&self.description, &self.location))
            .with_attendee_count(self.attendee_count)
    }

    /// Builder method to set the UID.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Builder method to set DTEND.
    pub fn with_end(mut self, end: EventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Builder method to set DURATION.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
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

    /// Builder method to set the repetition rule.
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Builder method to mark as an override of one occurrence.
    pub fn with_recurrence_id(mut self, recurrence_id: EventTime) -> Self {
        self.recurrence_id = Some(recurrence_id);
        self
    }

    /// Builder method to set the attendee count.
    pub fn with_attendee_count(mut self, count: usize) -> Self {
        self.attendee_count = count;
        self
    }

    /// Builder method to mark as cancelled.
    pub fn with_cancelled(mut self, cancelled: bool) -> Self {
        self.is_cancelled = cancelled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use dayglance_core::MeetingPlatform;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 5, h, m, 0).unwrap()
    }

    #[test]
    fn builder() {
        let event = RawEvent::new("Planning", EventTime::from_utc(utc(9, 0)))
            .with_uid("abc@example.com")
            .with_end(EventTime::from_utc(utc(10, 0)))
            .with_location("Room 1")
            .with_attendee_count(2)
            .with_recurrence(Recurrence::new("FREQ=DAILY"));

        assert_eq!(event.uid.as_deref(), Some("abc@example.com"));
        assert!(event.is_recurring());
        assert!(!event.is_all_day());
        assert_eq!(event.attendee_count, 2);
    }

    mod durations {
        use super::*;

        #[test]
        fn duration_wins_over_end() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)))
                .with_end(EventTime::from_utc(utc(10, 0)))
                .with_duration(Duration::minutes(30));
            assert_eq!(event.master_duration(&Utc), Duration::minutes(30));
        }

        #[test]
        fn end_minus_start() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)))
                .with_end(EventTime::from_utc(utc(10, 15)));
            assert_eq!(event.master_duration(&Utc), Duration::minutes(75));
        }

        #[test]
        fn nothing_is_zero() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)));
            assert_eq!(event.master_duration(&Utc), Duration::zero());
        }

        #[test]
        fn negative_is_clamped() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)))
                .with_end(EventTime::from_utc(utc(8, 0)));
            assert_eq!(event.master_duration(&Utc), Duration::zero());
            assert_eq!(event.span(&Utc), (utc(9, 0), utc(9, 0)));
        }
    }

    mod spans {
        use super::*;

        #[test]
        fn end_from_dtend() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)))
                .with_end(EventTime::from_utc(utc(10, 0)));
            assert_eq!(event.span(&Utc), (utc(9, 0), utc(10, 0)));
        }

        #[test]
        fn end_from_duration() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)))
                .with_duration(Duration::minutes(45));
            assert_eq!(event.span(&Utc), (utc(9, 0), utc(9, 45)));
        }

        #[test]
        fn missing_end_is_zero_length() {
            let event = RawEvent::new("x", EventTime::from_utc(utc(9, 0)));
            assert_eq!(event.span(&Utc), (utc(9, 0), utc(9, 0)));
        }

        #[test]
        fn all_day_resolves_to_midnight() {
            let date = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
            let event = RawEvent::new("Holiday", EventTime::from_date(date))
                .with_end(EventTime::from_date(date.succ_opt().unwrap()));
            let (start, end) = event.span(&Utc);
            assert_eq!(start, utc(0, 0));
            assert_eq!(end - start, Duration::days(1));
        }
    }

    #[test]
    fn occurrence_carries_link_and_fields() {
        let event = RawEvent::new("Sync", EventTime::from_utc(utc(9, 0)))
            .with_description("Join: https://meet.google.com/abc-defg-hij")
            .with_location("Online")
            .with_attendee_count(3);

        let occ = event.to_occurrence(utc(9, 0), utc(9, 30));
        assert_eq!(occ.title, "Sync");
        assert_eq!(occ.location, "Online");
        assert_eq!(occ.attendee_count, 3);
        assert_eq!(
            occ.conference_link.map(|l| l.platform),
            Some(MeetingPlatform::GoogleMeet)
        );
        assert!(occ.calendar_color.is_empty());
    }
}
