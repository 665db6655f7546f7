//! Log setup for the `dayglance` binary.
//!
//! Logs go to stderr so they never mix with the agenda on stdout. A one-shot
//! run only reports warnings; `watch` adds timestamps since its output lives
//! for hours. `RUST_LOG` overrides the level picked here.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors from installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// How log lines are filtered and decorated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level for the dayglance crates when `RUST_LOG` is unset.
    pub level: Level,
    /// Prefix every line with a timestamp.
    pub timestamps: bool,
    /// Show module path, file and line.
    pub locations: bool,
}

impl LogSettings {
    /// Settings for one invocation of the binary.
    pub fn for_run(watching: bool, debug: bool) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { Level::WARN },
            timestamps: watching,
            locations: debug,
        }
    }

    /// The filter directive used when `RUST_LOG` is unset.
    ///
    /// Target matching is by prefix, so `dayglance` covers every crate of the
    /// workspace and leaves dependencies such as reqwest quiet.
    pub fn directive(&self) -> String {
        format!("dayglance={}", self.level)
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

/// Installs the global subscriber. Call once, before any work starts.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(settings.locations)
        .with_file(settings.locations)
        .with_line_number(settings.locations);

    let layer = if settings.timestamps {
        layer.boxed()
    } else {
        layer.without_time().boxed()
    };

    tracing_subscriber::registry()
        .with(settings.filter())
        .with(layer)
        .try_init()?;
    Ok(())
}
