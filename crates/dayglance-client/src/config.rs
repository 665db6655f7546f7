//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/dayglance/config.toml` by default:
//!
//! ```toml
//! refresh_interval = 15
//! show_expired_events = true
//!
//! [[calendars]]
//! url = "webcal://calendar.example.com/team.ics"
//! color = "#3498db"
//!
//! [[calendars]]
//! url = "https://example.com/holidays.ics"
//!
//! [display]
//! hyperlinks = false
//!
//! [http]
//! timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dayglance_core::Source;
use dayglance_feeds::{FetchConfig, normalize_feed_url};

/// Colours handed out to calendars without one, by position.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e91e63", "#ff9800",
];

/// Default refresh interval for `watch`, in minutes.
pub const DEFAULT_REFRESH_MINUTES: u64 = 30;

/// Returns the palette colour for the calendar at `index`.
pub fn palette_color(index: usize) -> &'static str {
    DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
}

/// Returns true for `#rgb` and `#rrggbb` tokens.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the dayglance client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Calendar feeds, in display-priority order.
    pub calendars: Vec<CalendarEntry>,

    /// Minutes between refreshes in `watch` mode.
    pub refresh_interval: u64,

    /// Keep events that already ended (shown dimmed).
    pub show_expired_events: bool,

    /// Debug mode.
    pub debug: bool,

    /// Display settings.
    pub display: DisplaySettings,

    /// HTTP settings.
    pub http: HttpSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            calendars: Vec::new(),
            refresh_interval: DEFAULT_REFRESH_MINUTES,
            show_expired_events: false,
            debug: false,
            display: DisplaySettings::default(),
            http: HttpSettings::default(),
        }
    }
}

/// One `[[calendars]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// Feed URL (`https://`, `http://` or `webcal://`).
    pub url: String,

    /// Display colour; a palette colour is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CalendarEntry {
    /// Creates an entry without an explicit colour.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            color: None,
        }
    }

    /// Parses a command-line `URL[#COLOR]` value.
    ///
    /// The suffix is only taken as a colour if it is a hex colour, so URL
    /// fragments survive.
    pub fn from_arg(arg: &str) -> Self {
        if let Some((url, color)) = arg.rsplit_once('#') {
            let color = format!("#{}", color);
            if is_hex_color(&color) {
                return Self {
                    url: url.to_string(),
                    color: Some(color),
                };
            }
        }
        Self::new(arg)
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Emit OSC8 hyperlinks for meeting links.
    pub hyperlinks: bool,

    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,

    /// Text to show when no event is left for today.
    pub no_events_text: String,

    /// Text to show when no calendar is configured.
    pub no_calendars_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            hyperlinks: true,
            max_title_length: None,
            no_events_text: "No events scheduled for today".to_string(),
            no_calendars_text:
                "No ICS URL configured. Please add a calendar URL to the configuration."
                    .to_string(),
        }
    }
}

/// HTTP settings for feed retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Custom user agent.
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: FetchConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dayglance")
    }

    /// Returns the sources to aggregate, with palette colours filled in.
    pub fn sources(&self) -> Vec<Source> {
        self.calendars
            .iter()
            .enumerate()
            .map(|(index, calendar)| {
                let color = calendar
                    .color
                    .clone()
                    .unwrap_or_else(|| palette_color(index).to_string());
                Source::new(calendar.url.trim(), color)
            })
            .collect()
    }

    /// Returns true if at least one calendar has a non-blank URL.
    pub fn has_calendars(&self) -> bool {
        self.calendars.iter().any(|c| !c.url.trim().is_empty())
    }

    /// Returns the interval between refreshes in `watch` mode.
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.saturating_mul(60))
    }

    /// Builds the HTTP fetcher configuration.
    pub fn fetch_config(&self) -> FetchConfig {
        let config = FetchConfig::default().with_timeout(Duration::from_secs(self.http.timeout_secs));
        match self.http.user_agent {
            Some(ref user_agent) => config.with_user_agent(user_agent),
            None => config,
        }
    }

    /// Checks the configuration and returns every problem found.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.refresh_interval == 0 {
            problems.push("refresh_interval must be greater than 0".to_string());
        }
        if self.http.timeout_secs == 0 {
            problems.push("http.timeout_secs must be greater than 0".to_string());
        }

        for (index, calendar) in self.calendars.iter().enumerate() {
            if calendar.url.trim().is_empty() {
                problems.push(format!("calendars[{}]: url is empty", index));
            } else if let Err(e) = normalize_feed_url(&calendar.url) {
                problems.push(format!("calendars[{}]: {}", index, e.message()));
            }

            if let Some(ref color) = calendar.color
                && !is_hex_color(color)
            {
                problems.push(format!(
                    "calendars[{}]: color '{}' is not a #rrggbb value",
                    index, color
                ));
            }
        }

        problems
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn empty_file_gives_defaults() {
            let config: ClientConfig = toml::from_str("").unwrap();
            assert!(config.calendars.is_empty());
            assert_eq!(config.refresh_interval, 30);
            assert!(!config.show_expired_events);
            assert!(config.display.hyperlinks);
            assert_eq!(config.display.no_events_text, "No events scheduled for today");
            assert_eq!(config.http.timeout_secs, 30);
        }

        #[test]
        fn full_file() {
            let toml_content = r##"
refresh_interval = 15
show_expired_events = true

[[calendars]]
url = "webcal://calendar.example.com/team.ics"
color = "#123456"

[[calendars]]
url = "https://example.com/holidays.ics"

[display]
hyperlinks = false
no_events_text = "Free day"

[http]
timeout_secs = 10
user_agent = "my-agent"
"##;
            let config: ClientConfig = toml::from_str(toml_content).unwrap();
            assert_eq!(config.refresh_interval, 15);
            assert!(config.show_expired_events);
            assert_eq!(config.calendars.len(), 2);
            assert_eq!(config.calendars[0].color.as_deref(), Some("#123456"));
            assert!(!config.display.hyperlinks);
            assert_eq!(config.display.no_events_text, "Free day");
            assert!(config.display.no_calendars_text.starts_with("No ICS URL configured"));
            assert_eq!(config.http.user_agent.as_deref(), Some("my-agent"));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn load_from_file() {
            let tmp = tempfile::tempdir().unwrap();
            let path = tmp.path().join("config.toml");
            std::fs::write(&path, "[[calendars]]\nurl = \"https://example.com/a.ics\"\n").unwrap();

            let config = ClientConfig::load_from(&path).unwrap();
            assert_eq!(config.calendars, vec![CalendarEntry::new("https://example.com/a.ics")]);
        }

        #[test]
        fn load_from_missing_file_errors() {
            let tmp = tempfile::tempdir().unwrap();
            let err = ClientConfig::load_from(&tmp.path().join("nope.toml")).unwrap_err();
            assert!(err.contains("failed to read config"));
        }

        #[test]
        fn load_from_invalid_toml_errors() {
            let tmp = tempfile::tempdir().unwrap();
            let path = tmp.path().join("config.toml");
            std::fs::write(&path, "refresh_interval = \"soon\"\n").unwrap();
            let err = ClientConfig::load_from(&path).unwrap_err();
            assert!(err.contains("failed to parse config"));
        }
    }

    mod sources {
        use super::*;

        #[test]
        fn palette_fills_missing_colors_by_position() {
            let config = ClientConfig {
                calendars: vec![
                    CalendarEntry::new("https://a.example.com/a.ics"),
                    CalendarEntry {
                        url: "https://b.example.com/b.ics".to_string(),
                        color: Some("#000000".to_string()),
                    },
                    CalendarEntry::new(" https://c.example.com/c.ics "),
                ],
                ..Default::default()
            };

            let sources = config.sources();
            assert_eq!(sources[0].color, "#e74c3c");
            assert_eq!(sources[1].color, "#000000");
            assert_eq!(sources[2].color, "#2ecc71");
            assert_eq!(sources[2].url, "https://c.example.com/c.ics");
        }

        #[test]
        fn palette_wraps() {
            assert_eq!(palette_color(0), palette_color(8));
            assert_eq!(palette_color(7), "#ff9800");
        }

        #[test]
        fn has_calendars_ignores_blank_urls() {
            let mut config = ClientConfig::default();
            assert!(!config.has_calendars());
            config.calendars.push(CalendarEntry::new("  "));
            assert!(!config.has_calendars());
            config.calendars.push(CalendarEntry::new("https://a.example.com/a.ics"));
            assert!(config.has_calendars());
        }

        #[test]
        fn calendar_arg_with_color() {
            let entry = CalendarEntry::from_arg("https://example.com/a.ics#2ecc71");
            assert_eq!(entry.url, "https://example.com/a.ics");
            assert_eq!(entry.color.as_deref(), Some("#2ecc71"));
        }

        #[test]
        fn calendar_arg_keeps_fragment() {
            let entry = CalendarEntry::from_arg("https://example.com/a.ics#section");
            assert_eq!(entry.url, "https://example.com/a.ics#section");
            assert!(entry.color.is_none());
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn zero_refresh_interval() {
            let config = ClientConfig {
                refresh_interval: 0,
                ..Default::default()
            };
            assert!(config.validate().unwrap_err().contains("refresh_interval"));
        }

        #[test]
        fn bad_calendars() {
            let config = ClientConfig {
                calendars: vec![
                    CalendarEntry::new(""),
                    CalendarEntry::new("ftp://example.com/a.ics"),
                    CalendarEntry {
                        url: "https://example.com/a.ics".to_string(),
                        color: Some("blue".to_string()),
                    },
                ],
                ..Default::default()
            };
            let problems = config.problems();
            assert_eq!(problems.len(), 3);
            assert!(problems[0].contains("calendars[0]"));
            assert!(problems[1].contains("unsupported scheme"));
            assert!(problems[2].contains("'blue'"));
        }

        #[test]
        fn hex_colors() {
            assert!(is_hex_color("#fff"));
            assert!(is_hex_color("#3498DB"));
            assert!(!is_hex_color("3498db"));
            assert!(!is_hex_color("#34"));
            assert!(!is_hex_color("#zzzzzz"));
        }
    }

    #[test]
    fn derived_settings() {
        let config = ClientConfig {
            refresh_interval: 5,
            http: HttpSettings {
                timeout_secs: 7,
                user_agent: Some("agent/1".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(config.refresh_period(), Duration::from_secs(300));
        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(7));
        assert_eq!(fetch.user_agent, "agent/1");
    }

    #[test]
    fn default_path_ends_with_app_dir() {
        let path = ClientConfig::default_path();
        assert!(path.ends_with("dayglance/config.toml"));
    }
}
