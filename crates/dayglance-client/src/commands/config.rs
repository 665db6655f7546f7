//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration, listing every problem found.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let problems = config.problems();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  - {}", problem);
        }
        return Err(ClientError::Config(format!(
            "{} problem(s) found",
            problems.len()
        )));
    }

    if !config.has_calendars() {
        println!("No calendars configured.");
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    Ok(())
}
