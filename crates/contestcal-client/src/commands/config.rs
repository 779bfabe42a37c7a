//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the effective configuration with literal secrets masked.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("# config.toml ({})", path.display());
    println!("{}", render(config)?);
    Ok(())
}

/// Validates the configuration and resolves every credential reference.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;

    if let Some(ref clist) = config.clist {
        clist.to_provider_config()?;
        println!("clist credentials resolve.");
    }

    match config.google {
        Some(ref google) => {
            let provider = google.to_provider_config()?;
            println!("Google credentials are valid.");
            if !provider.token_path.exists() {
                println!(
                    "No Google token at {}, run 'contestcal auth google'.",
                    provider.token_path.display()
                );
            }
        }
        None => println!("No [google] section, sync will fail until credentials are added."),
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Shows the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

fn render(config: &ClientConfig) -> ClientResult<String> {
    toml::to_string_pretty(&redacted(config))
        .map_err(|e| ClientError::config(format!("failed to serialize config: {}", e)))
}

fn redacted(config: &ClientConfig) -> ClientConfig {
    let mut config = config.clone();
    if let Some(ref mut clist) = config.clist {
        mask(&mut clist.api_key);
    }
    if let Some(ref mut google) = config.google {
        mask(&mut google.client_secret);
    }
    config
}

// References are safe to show; literal values are not.
fn mask(value: &mut Option<String>) {
    if let Some(v) = value
        && !v.starts_with("env::")
        && !v.starts_with("pass::")
    {
        *v = "<redacted>".to_string();
    }
}
