//! Authentication commands.

use std::path::{Path, PathBuf};

use contestcal_providers::google::GoogleCalendar;
use tracing::{info, warn};

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};

/// Runs the Google OAuth flow.
///
/// `credentials_file` overrides the `[google]` section and, on success, is
/// written back to `config_path` so later runs find it.
pub async fn google(
    credentials_file: Option<PathBuf>,
    force: bool,
    config: &ClientConfig,
    config_path: &Path,
) -> ClientResult<()> {
    let settings = google_settings(credentials_file.as_deref(), config)?;
    let calendar = GoogleCalendar::new(settings.to_provider_config()?)?;

    if calendar.is_authenticated() && !calendar.needs_reauth() && !force {
        println!("Already authenticated with Google Calendar.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    if force {
        calendar.sign_out()?;
    }

    println!("Starting Google Calendar authentication...");
    println!();
    println!("A browser window will open for you to authorize access.");
    println!("If it does not, open the URL printed in the log.");
    println!();

    calendar.authenticate().await?;
    info!("Google authentication successful");

    if let Some(ref path) = credentials_file {
        match remember_credentials_file(config_path, path) {
            Ok(()) => println!("Credentials file recorded in {}", config_path.display()),
            Err(e) => warn!(error = %e, "could not record credentials file in config"),
        }
    }

    println!();
    println!("Authentication successful!");
    println!("Run `contestcal sync` to mirror upcoming contests.");
    Ok(())
}

/// The `[google]` settings with `credentials_file` applied on top.
fn google_settings(
    credentials_file: Option<&Path>,
    config: &ClientConfig,
) -> ClientResult<GoogleSettings> {
    let mut settings = config.google.clone().unwrap_or_default();
    if let Some(path) = credentials_file {
        if !path.is_file() {
            return Err(ClientError::config(format!(
                "credentials file {} does not exist",
                path.display()
            )));
        }
        settings.client_id = None;
        settings.client_secret = None;
        settings.credentials_file = Some(path.to_path_buf());
    }
    Ok(settings)
}

/// Sets `[google].credentials_file` in `config_path`, keeping the rest of
/// the file as written.
fn remember_credentials_file(config_path: &Path, credentials_file: &Path) -> ClientResult<()> {
    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ClientError::config(format!("failed to parse {}: {}", config_path.display(), e)))?;

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let google = doc["google"]
        .as_table_mut()
        .ok_or_else(|| ClientError::config("`google` in config.toml is not a table"))?;

    let absolute = std::path::absolute(credentials_file)?;
    google["credentials_file"] = toml_edit::value(absolute.to_string_lossy().as_ref());

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;
    Ok(())
}
