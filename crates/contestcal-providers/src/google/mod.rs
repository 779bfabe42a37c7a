//! Google Calendar service.
//!
//! Authorization uses the OAuth 2.0 installed-app flow: the user supplies a
//! client id and secret from the Cloud Console, `contestcal auth google`
//! opens the consent page and stores the granted token, and later runs
//! refresh it silently.
//!
//! # Example
//!
//! ```ignore
//! use contestcal_providers::google::{GoogleCalendar, GoogleConfig, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("credentials.json")?;
//! let calendar = GoogleCalendar::new(GoogleConfig::new(credentials))?;
//! if calendar.needs_reauth() {
//!     calendar.authenticate().await?;
//! }
//! let id = calendar.resolve_calendar("Contests").await?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;
mod tokens;

pub use client::{CalendarListEntry, GoogleCalendarClient};
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow};
pub use provider::GoogleCalendar;
pub use tokens::{TokenInfo, TokenStorage};
