//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod fetch;
pub mod sync;

use contestcal_providers::clist::ClistSource;
use contestcal_providers::google::GoogleCalendar;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds the contest source from `[clist]` and `favorite_hosts`.
pub(crate) fn clist_source(config: &ClientConfig) -> ClientResult<ClistSource> {
    let settings = config
        .clist
        .as_ref()
        .ok_or_else(|| ClientError::config("[clist] section is missing"))?;
    Ok(ClistSource::new(settings.to_provider_config()?, config.favorites())?)
}

/// Builds the calendar service and checks a token is stored.
pub(crate) fn google_calendar(config: &ClientConfig) -> ClientResult<GoogleCalendar> {
    let settings = config.google.clone().unwrap_or_default();
    let calendar = GoogleCalendar::new(settings.to_provider_config()?)?;
    if !calendar.is_authenticated() || calendar.needs_reauth() {
        return Err(ClientError::AuthRequired(
            "no usable Google token, run 'contestcal auth google'".to_string(),
        ));
    }
    Ok(calendar)
}
