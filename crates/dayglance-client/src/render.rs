//! Output rendering for the agenda.

use dayglance_core::{FormatOptions, FormattedEvent, OutputFormat, OutputFormatter};
use dayglance_feeds::AggregationReport;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Turns an aggregated agenda into terminal text or JSON.
#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    formatter: OutputFormatter,
    no_calendars_text: String,
}

impl Renderer {
    /// Creates a renderer from the client configuration.
    ///
    /// `terminal` says whether stdout is an interactive terminal; colours and
    /// hyperlinks are only emitted there.
    pub fn new(format: OutputFormat, config: &ClientConfig, terminal: bool, no_color: bool) -> Self {
        let options = FormatOptions {
            hyperlinks: terminal && config.display.hyperlinks,
            colors: terminal && !no_color,
            max_title_length: config.display.max_title_length,
            no_events_text: config.display.no_events_text.clone(),
        };
        Self {
            format,
            formatter: OutputFormatter::new(options),
            no_calendars_text: config.display.no_calendars_text.clone(),
        }
    }

    /// Returns the output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Renders today's agenda.
    pub fn render(&self, events: &[FormattedEvent]) -> ClientResult<String> {
        match self.format {
            OutputFormat::Tty => Ok(self.formatter.format_tty(events)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(events)?),
        }
    }

    /// Renders the state where no calendar is configured at all.
    pub fn render_no_calendars(&self) -> ClientResult<String> {
        match self.format {
            OutputFormat::Tty => Ok(self.no_calendars_text.clone()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&[] as &[FormattedEvent])?),
        }
    }
}

/// A one-line note for stderr when some calendars could not be loaded.
pub fn failure_hint(report: &AggregationReport) -> Option<String> {
    match report.failures.len() {
        0 => None,
        1 => Some(format!(
            "1 calendar could not be loaded: {}",
            report.failures[0].error
        )),
        n => Some(format!(
            "{} calendars could not be loaded (run with --debug for details)",
            n
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dayglance_feeds::{FeedError, SourceFailure};

    fn event(title: &str) -> FormattedEvent {
        FormattedEvent {
            title: title.to_string(),
            time: "9.00 am - 10.00 am".to_string(),
            location: "Room 1".to_string(),
            has_conference_link: true,
            conference_link: "https://meet.google.com/abc-defg-hij".to_string(),
            attendee_count: 2,
            is_all_day: false,
            calendar_color: "#3498db".to_string(),
            is_expired: false,
            starts_at: Utc.with_ymd_and_hms(2025, 2, 5, 9, 0, 0).unwrap(),
        }
    }

    fn renderer(format: OutputFormat) -> Renderer {
        Renderer::new(format, &ClientConfig::default(), false, false)
    }

    mod tty {
        use super::*;

        #[test]
        fn agenda() {
            let out = renderer(OutputFormat::Tty).render(&[event("Standup")]).unwrap();
            insta::assert_snapshot!(out, @r"
            Today's Schedule
            • 9.00 am - 10.00 am   Standup  (2 guests)  [Join Meeting: https://meet.google.com/abc-defg-hij]
            ");
        }

        #[test]
        fn empty_states() {
            let renderer = renderer(OutputFormat::Tty);
            assert_eq!(renderer.render(&[]).unwrap(), "No events scheduled for today");
            assert_eq!(
                renderer.render_no_calendars().unwrap(),
                "No ICS URL configured. Please add a calendar URL to the configuration."
            );
        }

        #[test]
        fn terminal_enables_hyperlinks_and_colors() {
            let renderer = Renderer::new(OutputFormat::Tty, &ClientConfig::default(), true, false);
            let out = renderer.render(&[event("Standup")]).unwrap();
            assert!(out.contains("\x1b]8;;https://meet.google.com/abc-defg-hij"));
            assert!(out.contains("\x1b[38;2;52;152;219m●"));
        }

        #[test]
        fn no_color_keeps_hyperlinks() {
            let renderer = Renderer::new(OutputFormat::Tty, &ClientConfig::default(), true, true);
            let out = renderer.render(&[event("Standup")]).unwrap();
            assert!(out.contains("\x1b]8;;"));
            assert!(!out.contains("\x1b[38;2"));
        }
    }

    mod json {
        use super::*;

        #[test]
        fn camel_case_list() {
            let out = renderer(OutputFormat::Json).render(&[event("Standup")]).unwrap();
            let value: serde_json::Value = serde_json::from_str(&out).unwrap();
            let first = &value[0];
            assert_eq!(first["title"], "Standup");
            assert_eq!(first["hasConferenceLink"], true);
            assert_eq!(first["attendeeCount"], 2);
            assert_eq!(first["calendarColor"], "#3498db");
            assert_eq!(first["isAllDay"], false);
            assert_eq!(first["isExpired"], false);
        }

        #[test]
        fn empty_states_are_empty_lists() {
            let renderer = renderer(OutputFormat::Json);
            assert_eq!(renderer.render(&[]).unwrap(), "[]");
            assert_eq!(renderer.render_no_calendars().unwrap(), "[]");
        }
    }

    #[test]
    fn hints() {
        let mut report = AggregationReport::default();
        assert!(failure_hint(&report).is_none());

        report.failures.push(SourceFailure {
            index: 0,
            url: "https://a.example.com/a.ics".to_string(),
            error: FeedError::not_found("calendar not found"),
        });
        assert!(failure_hint(&report).unwrap().starts_with("1 calendar could not be loaded"));

        report.failures.push(SourceFailure {
            index: 1,
            url: "https://b.example.com/b.ics".to_string(),
            error: FeedError::timeout("timed out"),
        });
        assert_eq!(
            failure_hint(&report).unwrap(),
            "2 calendars could not be loaded (run with --debug for details)"
        );
    }
}
