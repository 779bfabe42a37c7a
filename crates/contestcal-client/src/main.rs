//! contestcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use contestcal_client::cli::{AuthProvider, Cli, Command, ConfigAction};
use contestcal_client::commands;
use contestcal_client::config::ClientConfig;
use contestcal_client::error::ClientResult;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    contestcal_core::init_tracing(config.tracing_config(cli.debug))?;

    match cli.resolved_command() {
        Command::Sync { dry_run, days } => commands::sync::run(&config, dry_run, days).await,
        Command::Fetch { days, json } => commands::fetch::run(&config, days, json).await,
        Command::Auth { provider } => match provider {
            AuthProvider::Google {
                credentials_file,
                force,
            } => commands::auth::google(credentials_file, force, &config, &config_path).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
