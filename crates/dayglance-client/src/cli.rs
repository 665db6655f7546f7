//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dayglance_core::OutputFormat;

use crate::config::{CalendarEntry, ClientConfig};

/// dayglance - Today's calendar agenda at a glance
#[derive(Debug, Parser)]
#[command(name = "dayglance")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DAYGLANCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Output format flags ---
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    // --- Source flags ---
    /// Calendar feed as URL[#RRGGBB], replaces the configured calendars (can be repeated)
    #[arg(long = "calendar", value_name = "URL", action = clap::ArgAction::Append)]
    pub calendars: Vec<String>,

    // --- Display options ---
    /// Keep events that already ended today
    #[arg(long)]
    pub show_expired: bool,

    /// Maximum title length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,

    /// Do not emit terminal hyperlinks for meeting links
    #[arg(long)]
    pub no_hyperlinks: bool,

    /// Do not colour the output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tty
        }
    }

    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, mut config: ClientConfig) -> ClientConfig {
        if !self.calendars.is_empty() {
            config.calendars = self
                .calendars
                .iter()
                .map(|arg| CalendarEntry::from_arg(arg))
                .collect();
        }
        if self.show_expired {
            config.show_expired_events = true;
        }
        if self.debug {
            config.debug = true;
        }
        if self.no_hyperlinks {
            config.display.hyperlinks = false;
        }
        if self.max_title_length.is_some() {
            config.display.max_title_length = self.max_title_length;
        }
        if let Some(Command::Watch {
            interval: Some(minutes),
        }) = self.command
        {
            config.refresh_interval = minutes;
        }
        config
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh the agenda periodically until interrupted
    Watch {
        /// Minutes between refreshes (overrides refresh_interval)
        #[arg(long, short)]
        interval: Option<u64>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dayglance").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.output_format(), OutputFormat::Tty);
        assert!(cli.command.is_none());
        assert!(cli.calendars.is_empty());
    }

    #[test]
    fn json_flag() {
        assert_eq!(parse(&["--json"]).output_format(), OutputFormat::Json);
    }

    #[test]
    fn calendars_replace_configured_ones() {
        let cli = parse(&[
            "--calendar",
            "https://a.example.com/a.ics#ff0000",
            "--calendar",
            "webcal://b.example.com/b.ics",
        ]);
        let mut config = ClientConfig::default();
        config.calendars.push(CalendarEntry::new("https://old.example.com/x.ics"));

        let config = cli.apply_to(config);
        assert_eq!(config.calendars.len(), 2);
        assert_eq!(config.calendars[0].color.as_deref(), Some("#ff0000"));
        assert_eq!(config.calendars[1].url, "webcal://b.example.com/b.ics");
    }

    #[test]
    fn overrides() {
        let cli = parse(&["--show-expired", "--no-hyperlinks", "--max-title-length", "20", "-v"]);
        let config = cli.apply_to(ClientConfig::default());
        assert!(config.show_expired_events);
        assert!(!config.display.hyperlinks);
        assert_eq!(config.display.max_title_length, Some(20));
        assert!(config.debug);
    }

    #[test]
    fn flags_do_not_reset_config() {
        let mut config = ClientConfig::default();
        config.show_expired_events = true;
        let config = parse(&[]).apply_to(config);
        assert!(config.show_expired_events);
    }

    #[test]
    fn watch_interval() {
        let cli = parse(&["watch", "--interval", "5"]);
        let config = cli.apply_to(ClientConfig::default());
        assert_eq!(config.refresh_interval, 5);

        let cli = parse(&["watch"]);
        let config = cli.apply_to(ClientConfig::default());
        assert_eq!(config.refresh_interval, 30);
    }

    #[test]
    fn config_subcommands() {
        let cli = parse(&["config", "validate"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        ));
    }
}
