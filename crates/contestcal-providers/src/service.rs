//! Capability traits for the two external services.
//!
//! [`ContestSource`] produces upcoming contests, [`CalendarService`] reads
//! and writes the events that mirror them. The sync engine only sees these
//! traits, so the real HTTP implementations and the in-memory fakes are
//! interchangeable.

use std::future::Future;
use std::pin::Pin;

use contestcal_core::{CalendarEvent, ContestRecord, EventPayload, TimeWindow};

use crate::error::ProviderResult;

/// Calendar id used when no named calendar is configured or found.
pub const PRIMARY_CALENDAR: &str = "primary";

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits object-safe so runners can hold
/// `Box<dyn CalendarService>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read and write access to a calendar.
///
/// # Example Implementation
///
/// ```ignore
/// impl CalendarService for MyCalendar {
///     fn name(&self) -> &str { "mine" }
///
///     fn list_events<'a>(
///         &'a self,
///         calendar_id: &'a str,
///         window: TimeWindow,
///     ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
///         Box::pin(async move { Ok(self.fetch(calendar_id, window).await?) })
///     }
///     // ... other methods
/// }
/// ```
pub trait CalendarService: Send + Sync {
    /// Returns the name of this service (e.g., "google", "memory").
    fn name(&self) -> &str;

    /// Maps a calendar display name to its id.
    ///
    /// The default implementation always answers [`PRIMARY_CALENDAR`].
    fn resolve_calendar<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async { Ok(PRIMARY_CALENDAR.to_string()) })
    }

    /// Lists every event that overlaps `window`: it ends after the window
    /// starts and starts before the window ends.
    ///
    /// Pagination is handled internally; the result is complete.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>>;

    /// Inserts a new event. The payload carries the event id.
    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        payload: &'a EventPayload,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Partially updates an existing event.
    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        payload: &'a EventPayload,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

/// A producer of upcoming contests.
pub trait ContestSource: Send + Sync {
    /// Returns the name of this source (e.g., "clist").
    fn name(&self) -> &str;

    /// Fetches the contests starting inside `window`, already filtered to
    /// the favorite hosts.
    fn fetch_upcoming(&self, window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<ContestRecord>>>;
}
