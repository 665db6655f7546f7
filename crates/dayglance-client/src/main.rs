//! dayglance CLI entry point.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use dayglance_client::cli::{Cli, Command, ConfigAction};
use dayglance_client::commands;
use dayglance_client::config::ClientConfig;
use dayglance_client::error::{ClientError, ClientResult};
use dayglance_client::render::Renderer;
use dayglance_core::{LogSettings, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };
    let config = cli.apply_to(config);

    let watching = matches!(cli.command, Some(Command::Watch { .. }));
    init_logging(&LogSettings::for_run(watching, config.debug))?;

    let renderer = Renderer::new(
        cli.output_format(),
        &config,
        std::io::stdout().is_terminal(),
        cli.no_color,
    );

    // Handle subcommands
    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        Some(Command::Watch { .. }) => commands::agenda::watch(&config, &renderer).await,
        None => commands::agenda::show(&config, &renderer).await,
    }
}
