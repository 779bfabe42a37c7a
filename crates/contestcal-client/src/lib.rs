//! Command-line front end
//!
//! This crate provides the `contestcal` binary: configuration loading,
//! credential references, and the `sync`, `fetch`, `auth` and `config`
//! subcommands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
