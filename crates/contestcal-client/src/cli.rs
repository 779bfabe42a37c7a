//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contestcal_sync::MAX_WINDOW_DAYS;

/// contestcal - upcoming programming contests in your Google Calendar
#[derive(Debug, Parser)]
#[command(name = "contestcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CONTESTCAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The subcommand to run; a bare invocation syncs.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Sync {
            dry_run: false,
            days: None,
        })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Mirror upcoming contests into the calendar (default)
    Sync {
        /// Print the planned changes without writing
        #[arg(long)]
        dry_run: bool,

        /// Days ahead to sync, overriding window_days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS as i64))]
        days: Option<u32>,
    },

    /// Print the contests a sync would consider
    Fetch {
        /// Days ahead to fetch, overriding window_days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS as i64))]
        days: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Authorize calendar access
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AuthProvider {
    /// Run the Google OAuth flow and store the token
    Google {
        /// Google Cloud Console credentials.json, remembered in config.toml
        #[arg(long)]
        credentials_file: Option<PathBuf>,

        /// Re-authorize even if a valid token exists
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Dump,
    /// Check the configuration and credentials
    Validate,
    /// Print the configuration file path
    Path,
}
