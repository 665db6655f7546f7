//! Agenda commands: one-shot display and `watch`.

use std::io::{IsTerminal, Write};

use chrono::{DateTime, Local, TimeZone};
use tracing::{error, info, warn};

use dayglance_core::OutputFormat;
use dayglance_feeds::{Aggregator, FeedFetcher, HttpFetcher};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render::{Renderer, failure_hint};
use crate::watch::{ctrl_c, refresh_loop};

/// Clears the terminal and moves the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Builds an aggregator backed by the HTTP fetcher.
pub fn http_aggregator(config: &ClientConfig) -> ClientResult<Aggregator<HttpFetcher>> {
    let fetcher = HttpFetcher::new(config.fetch_config())?;
    Ok(Aggregator::new(fetcher))
}

/// Runs one aggregation pass and renders it.
///
/// Partially failing sources still render; a hint goes to stderr.
pub async fn agenda_pass<F, Tz>(
    aggregator: &Aggregator<F>,
    config: &ClientConfig,
    renderer: &Renderer,
    now: DateTime<Tz>,
) -> ClientResult<String>
where
    F: FeedFetcher,
    Tz: TimeZone,
{
    if !config.has_calendars() {
        return renderer.render_no_calendars();
    }

    let report = aggregator
        .aggregate_with_report(&config.sources(), config.show_expired_events, now)
        .await;

    if let Some(hint) = failure_hint(&report) {
        warn!(failed = report.failures.len(), "Some calendars failed");
        eprintln!("warning: {}", hint);
    }

    renderer.render(&report.events)
}

/// Prints today's agenda once.
pub async fn show(config: &ClientConfig, renderer: &Renderer) -> ClientResult<()> {
    let aggregator = http_aggregator(config)?;
    let output = agenda_pass(&aggregator, config, renderer, Local::now()).await?;
    println!("{}", output);
    Ok(())
}

/// Prints the agenda, then refreshes it every `refresh_interval` minutes
/// until Ctrl+C.
pub async fn watch(config: &ClientConfig, renderer: &Renderer) -> ClientResult<()> {
    if config.refresh_interval == 0 {
        return Err(ClientError::Config(
            "refresh_interval must be greater than 0".to_string(),
        ));
    }

    let aggregator = http_aggregator(config)?;
    let clear = renderer.format() == OutputFormat::Tty && std::io::stdout().is_terminal();

    info!(
        calendars = config.calendars.len(),
        interval_minutes = config.refresh_interval,
        "Watching agenda"
    );

    let aggregator = &aggregator;
    let passes = refresh_loop(config.refresh_period(), ctrl_c(), move || async move {
        match agenda_pass(aggregator, config, renderer, Local::now()).await {
            Ok(output) => {
                if let Err(e) = print_frame(&output, clear) {
                    error!(error = %e, "Failed to write agenda");
                }
            }
            Err(e) => error!(error = %e, "Refresh failed"),
        }
    })
    .await;

    info!(passes, "Stopped watching");
    Ok(())
}

fn print_frame(output: &str, clear: bool) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    if clear {
        stdout.write_all(CLEAR_SCREEN.as_bytes())?;
    }
    writeln!(stdout, "{}", output)?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::Utc;
    use dayglance_feeds::{BoxFuture, FeedError, FeedResult};

    use crate::config::CalendarEntry;

    /// Serves canned feed bodies by URL.
    struct CannedFetcher {
        feeds: HashMap<String, String>,
    }

    impl FeedFetcher for CannedFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, FeedResult<String>> {
            Box::pin(async move {
                self.feeds
                    .get(url)
                    .cloned()
                    .ok_or_else(|| FeedError::not_found("calendar not found").with_url(url))
            })
        }
    }

    const TEAM_FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:standup@example.com\r\n\
SUMMARY:Standup\r\n\
DTSTART:20250205T090000Z\r\n\
DTEND:20250205T091500Z\r\n\
RRULE:FREQ=DAILY\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:review@example.com\r\n\
SUMMARY:Design review\r\n\
DTSTART:20250206T140000Z\r\n\
DTEND:20250206T150000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn aggregator() -> Aggregator<CannedFetcher> {
        let mut feeds = HashMap::new();
        feeds.insert("https://team.example.com/team.ics".to_string(), TEAM_FEED.to_string());
        Aggregator::new(CannedFetcher { feeds })
    }

    fn config(urls: &[&str]) -> ClientConfig {
        ClientConfig {
            calendars: urls.iter().map(|url| CalendarEntry::new(*url)).collect(),
            ..Default::default()
        }
    }

    fn renderer(config: &ClientConfig) -> Renderer {
        Renderer::new(OutputFormat::Tty, config, false, false)
    }

    #[tokio::test]
    async fn renders_todays_occurrences() {
        let config = config(&["https://team.example.com/team.ics"]);
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 8, 0, 0).unwrap();

        let out = agenda_pass(&aggregator(), &config, &renderer(&config), now)
            .await
            .unwrap();
        insta::assert_snapshot!(out, @r"
        Today's Schedule
        • 9.00 am - 9.15 am    Standup
        ");
    }

    #[tokio::test]
    async fn failing_source_still_renders_the_rest() {
        let config = config(&[
            "https://missing.example.com/gone.ics",
            "https://team.example.com/team.ics",
        ]);
        let now = Utc.with_ymd_and_hms(2025, 2, 6, 8, 0, 0).unwrap();

        let out = agenda_pass(&aggregator(), &config, &renderer(&config), now)
            .await
            .unwrap();
        assert!(out.contains("Standup"));
        assert!(out.contains("Design review"));
    }

    #[tokio::test]
    async fn no_calendars() {
        let config = config(&["   "]);
        let now = Utc.with_ymd_and_hms(2025, 2, 6, 8, 0, 0).unwrap();

        let out = agenda_pass(&aggregator(), &config, &renderer(&config), now)
            .await
            .unwrap();
        assert!(out.starts_with("No ICS URL configured"));
    }

    #[tokio::test]
    async fn nothing_today() {
        let config = config(&["https://team.example.com/team.ics"]);
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();

        let out = agenda_pass(&aggregator(), &config, &renderer(&config), now)
            .await
            .unwrap();
        assert_eq!(out, "No events scheduled for today");
    }

    #[tokio::test]
    async fn watch_rejects_zero_interval() {
        let config = ClientConfig {
            refresh_interval: 0,
            ..Default::default()
        };
        let err = watch(&config, &renderer(&config)).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
