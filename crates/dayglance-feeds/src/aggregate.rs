//! The aggregation pass: sources in, today's agenda out.
//!
//! Each source goes through fetch, parse and per-day projection on its own and
//! yields a [`FeedResult`]. The pass folds those results: successes are merged,
//! failures are logged and reported but never abort the pass. The merged
//! occurrences are then ordered (all-day first, then by start), formatted, and
//! filtered by the expired-event policy without re-sorting.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::{debug, info, warn};

use dayglance_core::{EventTime, FormattedEvent, Occurrence, Source, TimeWindow, format_occurrence};

use crate::error::{FeedError, FeedResult};
use crate::fetch::FeedFetcher;
use crate::ics::parse_calendar;
use crate::raw_event::RawEvent;
use crate::recurrence::{Expansion, expand_for_day};

/// What one healthy source contributed.
#[derive(Debug, Clone, Default)]
pub struct SourceEvents {
    /// The feed's own name, if it declares one.
    pub calendar_name: Option<String>,
    /// Occurrences on the target day, tagged with the source colour.
    pub occurrences: Vec<Occurrence>,
}

/// A source that contributed nothing because it failed.
#[derive(Debug)]
pub struct SourceFailure {
    /// Position of the source in the input list.
    pub index: usize,
    /// The source URL.
    pub url: String,
    /// Why it failed.
    pub error: FeedError,
}

/// The result of an aggregation pass with per-source diagnostics.
#[derive(Debug, Default)]
pub struct AggregationReport {
    /// The ordered, formatted, filtered agenda.
    pub events: Vec<FormattedEvent>,
    /// Sources that failed to fetch or parse.
    pub failures: Vec<SourceFailure>,
    /// Number of sources skipped for having a blank URL.
    pub skipped: usize,
}

impl AggregationReport {
    /// Returns true if at least one source failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Drives fetch, parse, expansion and formatting for a list of sources.
#[derive(Debug, Clone)]
pub struct Aggregator<F: FeedFetcher> {
    fetcher: F,
}

impl<F: FeedFetcher> Aggregator<F> {
    /// Creates a new aggregator around a fetcher.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Returns the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns today's agenda across `sources`.
    ///
    /// "Today" is the calendar day of `now` in `now`'s zone, and times are
    /// displayed in that zone. Failing sources contribute nothing; an empty
    /// or all-failing source list yields an empty agenda.
    pub async fn aggregate_today_events<Tz: TimeZone>(
        &self,
        sources: &[Source],
        show_expired_events: bool,
        now: DateTime<Tz>,
    ) -> Vec<FormattedEvent> {
        self.aggregate_with_report(sources, show_expired_events, now)
            .await
            .events
    }

    /// Like [`Aggregator::aggregate_today_events`], also listing failed sources.
    pub async fn aggregate_with_report<Tz: TimeZone>(
        &self,
        sources: &[Source],
        show_expired_events: bool,
        now: DateTime<Tz>,
    ) -> AggregationReport {
        let tz = now.timezone();
        let target = now.date_naive();
        let now_utc = now.with_timezone(&Utc);

        let mut report = AggregationReport::default();
        let mut merged = Vec::new();

        for (index, source) in sources.iter().enumerate() {
            if source.is_blank() {
                debug!(index, "Skipping source with blank URL");
                report.skipped += 1;
                continue;
            }

            match self.collect_source(source, target, &tz).await {
                Ok(contribution) => {
                    debug!(
                        index,
                        url = %source.url,
                        calendar = ?contribution.calendar_name,
                        count = contribution.occurrences.len(),
                        "Source collected"
                    );
                    merged.extend(contribution.occurrences);
                }
                Err(error) => {
                    let error = if error.url().is_some() {
                        error
                    } else {
                        error.with_url(&source.url)
                    };
                    warn!(index, url = %source.url, code = %error.code(), error = %error, "Source failed");
                    report.failures.push(SourceFailure {
                        index,
                        url: source.url.clone(),
                        error,
                    });
                }
            }
        }

        let ordered = order_occurrences(merged);
        report.events = finalize(&ordered, show_expired_events, now_utc, &tz);

        info!(
            date = %target,
            sources = sources.len(),
            failed = report.failures.len(),
            events = report.events.len(),
            "Aggregation pass complete"
        );

        report
    }

    async fn collect_source<Tz: TimeZone>(
        &self,
        source: &Source,
        target: NaiveDate,
        tz: &Tz,
    ) -> FeedResult<SourceEvents> {
        let body = self.fetcher.fetch(&source.url).await?;
        let calendar = parse_calendar(&body)?;

        let occurrences = occurrences_for_day(&calendar.events, target, tz)
            .into_iter()
            .map(|occ| occ.with_color(source.color.clone()))
            .collect();

        Ok(SourceEvents {
            calendar_name: calendar.name,
            occurrences,
        })
    }
}

/// Projects one feed's events onto `target`.
///
/// Cancelled events are dropped. Non-recurring events are kept when their
/// start falls on `target`; recurring events go through the expander, with
/// the RECURRENCE-IDs of same-UID overrides excluded from the master. A rule
/// that cannot be parsed drops only its own event.
pub fn occurrences_for_day<Tz: TimeZone>(
    events: &[RawEvent],
    target: NaiveDate,
    tz: &Tz,
) -> Vec<Occurrence> {
    let overrides = overridden_instances(events);
    let window = TimeWindow::for_date(target, tz);

    events
        .iter()
        .filter(|event| !event.is_cancelled)
        .filter_map(|event| {
            if !event.is_recurring() {
                let (start, end) = event.span(tz);
                return window
                    .contains(start)
                    .then(|| event.to_occurrence(start, end));
            }

            let overridden = event
                .uid
                .as_ref()
                .and_then(|uid| overrides.get(uid.as_str()))
                .map(Vec::as_slice)
                .unwrap_or_default();

            match expand_for_day(event, target, tz, overridden) {
                Ok(Expansion::Found { start, end }) => Some(event.to_occurrence(start, end)),
                Ok(outcome) => {
                    debug!(title = %event.title, outcome = ?outcome, "No occurrence on target day");
                    None
                }
                Err(error) => {
                    warn!(title = %event.title, uid = ?event.uid, error = %error, "Skipping event with unusable rule");
                    None
                }
            }
        })
        .collect()
}

/// RECURRENCE-IDs per UID, including cancelled overrides.
fn overridden_instances(events: &[RawEvent]) -> HashMap<&str, Vec<EventTime>> {
    let mut overrides: HashMap<&str, Vec<EventTime>> = HashMap::new();
    for event in events {
        if let (Some(uid), Some(recurrence_id)) = (&event.uid, &event.recurrence_id) {
            overrides
                .entry(uid.as_str())
                .or_default()
                .push(recurrence_id.clone());
        }
    }
    overrides
}

/// Orders occurrences: all-day first, then ascending start.
///
/// The sort is stable, so source order and event order break ties.
pub fn order_occurrences(mut occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
    occurrences.sort_by_key(|occ| (!occ.is_all_day, occ.start));
    occurrences
}

/// Formats ordered occurrences and applies the expired-event policy.
///
/// Order is preserved; hidden events are removed, never re-sorted.
pub fn finalize<Tz: TimeZone>(
    ordered: &[Occurrence],
    show_expired_events: bool,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<FormattedEvent> {
    ordered
        .iter()
        .map(|occ| format_occurrence(occ, now, tz))
        .filter(|event| show_expired_events || !event.is_expired)
        .collect()
}
