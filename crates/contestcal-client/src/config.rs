//! Client configuration.
//!
//! Everything lives in one `config.toml`, by default
//! `~/.config/contestcal/config.toml`:
//!
//! ```toml
//! favorite_hosts = ["codeforces.com", "atcoder.jp"]
//! window_days = 7
//!
//! [clist]
//! username = "env::CLIST_USERNAME"
//! api_key = "pass::clist/api-key"
//!
//! [google]
//! credentials_file = "/home/me/.config/contestcal/credentials.json"
//! calendar_name = "Programming"
//!
//! [logging]
//! file = "log/contestcal.log"
//! keep = 7
//! ```
//!
//! Credential values accept the references understood by
//! [`secret::resolve`](crate::secret::resolve).

use std::path::{Path, PathBuf};
use std::time::Duration;

use contestcal_core::{FavoriteHosts, TracingConfig, TracingOutputFormat};
use contestcal_providers::clist::ClistConfig;
use contestcal_providers::google::{GoogleConfig, OAuthCredentials};
use contestcal_sync::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, SyncConfig};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Google Calendar offers eleven event colors, one per favorite host.
pub const MAX_FAVORITE_HOSTS: usize = 11;

/// Configuration for the contestcal client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Hosts to sync, highest color priority first.
    pub favorite_hosts: Vec<String>,

    /// Days ahead to sync, starting today at 00:00 UTC.
    pub window_days: u32,

    /// clist.by API access.
    pub clist: Option<ClistSettings>,

    /// Google Calendar settings.
    pub google: Option<GoogleSettings>,

    /// Log output.
    pub logging: LoggingSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            favorite_hosts: Vec::new(),
            window_days: DEFAULT_WINDOW_DAYS,
            clist: None,
            google: None,
            logging: LoggingSettings::default(),
        }
    }
}

/// clist.by credentials and endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClistSettings {
    pub username: Option<String>,
    pub api_key: Option<String>,
    /// Alternative API root, mostly for mirrors and tests.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

/// Google Calendar provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// OAuth client id. Takes precedence over `credentials_file`.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Cloud Console `credentials.json`.
    pub credentials_file: Option<PathBuf>,

    /// Display name of the calendar to write into.
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Where the authorized token is stored.
    pub token_path: Option<PathBuf>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            credentials_file: None,
            calendar_name: default_calendar_name(),
            token_path: None,
        }
    }
}

fn default_calendar_name() -> String {
    SyncConfig::DEFAULT_CALENDAR_NAME.to_string()
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file, next to console output. Rolls over daily.
    pub file: Option<PathBuf>,

    /// Daily log files to keep.
    pub keep: Option<usize>,

    /// Emit JSON records instead of text.
    pub json: bool,
}

impl ClientConfig {
    /// Loads the default file, or defaults when it does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads a specific file.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contestcal")
    }

    /// Checks everything a sync run needs, without resolving secrets.
    pub fn validate(&self) -> ClientResult<()> {
        if self.favorite_hosts.is_empty() {
            return Err(ClientError::config("favorite_hosts must list at least one host"));
        }
        if self.favorite_hosts.len() > MAX_FAVORITE_HOSTS {
            return Err(ClientError::config(format!(
                "favorite_hosts has {} entries, at most {} fit the calendar colors",
                self.favorite_hosts.len(),
                MAX_FAVORITE_HOSTS
            )));
        }
        if let Some(empty) = self.favorite_hosts.iter().position(|h| h.trim().is_empty()) {
            return Err(ClientError::config(format!("favorite_hosts[{}] is empty", empty)));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            return Err(ClientError::config(format!(
                "window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }

        let clist = self.clist.as_ref().ok_or_else(|| {
            ClientError::config(format!(
                "clist credentials not found. Add to {}:\n  \
                 [clist]\n  \
                 username = \"YOUR_USERNAME\"\n  \
                 api_key = \"env::CLIST_API_KEY\"",
                Self::default_path().display()
            ))
        })?;
        if clist.username.is_none() {
            return Err(ClientError::config("username is missing from [clist]"));
        }
        if clist.api_key.is_none() {
            return Err(ClientError::config("api_key is missing from [clist]"));
        }
        Ok(())
    }

    /// The favorite list in priority order.
    pub fn favorites(&self) -> FavoriteHosts {
        FavoriteHosts::new(self.favorite_hosts.iter().map(|h| h.trim()))
    }

    /// Sync settings, with `days` overriding `window_days`.
    pub fn sync_config(&self, days: Option<u32>) -> SyncConfig {
        let calendar_name = self
            .google
            .as_ref()
            .map(|g| g.calendar_name.clone())
            .unwrap_or_else(default_calendar_name);

        SyncConfig::new(self.favorites())
            .with_calendar_name(calendar_name)
            .with_window_days(days.unwrap_or(self.window_days))
    }

    /// Tracing settings for this run. `verbose` switches to debug output.
    pub fn tracing_config(&self, verbose: bool) -> TracingConfig {
        let mut config = if verbose {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::default().with_level(Level::INFO)
        };
        if self.logging.json {
            config = config.with_format(TracingOutputFormat::Json);
        }
        if let Some(ref file) = self.logging.file {
            config = config.with_log_file(file);
        }
        if let Some(keep) = self.logging.keep {
            config = config.with_log_keep(keep);
        }
        config
    }
}

impl ClistSettings {
    /// Resolves credentials into the fetcher configuration.
    pub fn to_provider_config(&self) -> ClientResult<ClistConfig> {
        let username = resolve_field("clist", "username", self.username.as_deref())?;
        let api_key = resolve_field("clist", "api_key", self.api_key.as_deref())?;

        let mut config = ClistConfig::new(username, api_key);
        if let Some(ref base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

impl GoogleSettings {
    /// Converts to provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<GoogleConfig> {
        let credentials = self.resolve_credentials()?;
        credentials
            .validate()
            .map_err(|e| ClientError::config(format!("invalid Google credentials: {}", e)))?;

        let mut config = GoogleConfig::new(credentials);
        if let Some(ref path) = self.token_path {
            config = config.with_token_path(path);
        }
        Ok(config)
    }

    /// Resolves OAuth credentials.
    ///
    /// Inline `client_id`/`client_secret` win; otherwise `credentials_file`
    /// is read.
    pub fn resolve_credentials(&self) -> ClientResult<OAuthCredentials> {
        if self.client_id.is_some() || self.client_secret.is_some() {
            let client_id = resolve_field("google", "client_id", self.client_id.as_deref())?;
            let client_secret =
                resolve_field("google", "client_secret", self.client_secret.as_deref())?;
            return Ok(OAuthCredentials::new(client_id, client_secret));
        }

        let path = self.credentials_file.as_ref().ok_or_else(|| {
            ClientError::config(format!(
                "Google credentials not found. Add to {}:\n  \
                 [google]\n  \
                 credentials_file = \"/path/to/credentials.json\"\n\n  \
                 Or run: contestcal auth google --credentials-file <path>",
                ClientConfig::default_path().display()
            ))
        })?;
        Ok(OAuthCredentials::from_file(path)?)
    }
}

fn resolve_field(section: &str, key: &str, value: Option<&str>) -> ClientResult<String> {
    let raw = value
        .ok_or_else(|| ClientError::config(format!("{} is missing from [{}]", key, section)))?;
    secret::resolve(raw)
        .map_err(|e| ClientError::config(format!("failed to resolve {}.{}: {}", section, key, e)))
}
