//! In-memory services for tests and dry runs.
//!
//! [`MemoryCalendar`] keeps events in a vector and records every write so
//! callers can assert on exactly what would have been sent. Failures can be
//! injected per event id or for listing.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use contestcal_core::{CalendarEvent, ContestRecord, EventPayload, TimeWindow};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::service::{BoxFuture, CalendarService, ContestSource, PRIMARY_CALENDAR};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A write observed by [`MemoryCalendar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    /// An insert.
    Create {
        calendar_id: String,
        payload: EventPayload,
    },
    /// A patch of an existing event.
    Update {
        calendar_id: String,
        event_id: String,
        payload: EventPayload,
    },
}

impl WriteCall {
    /// The event id this write targets.
    pub fn event_id(&self) -> &str {
        match self {
            Self::Create { payload, .. } => &payload.id,
            Self::Update { event_id, .. } => event_id,
        }
    }
}

/// A calendar held in memory.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    writes: Mutex<Vec<WriteCall>>,
    failing_ids: Mutex<HashSet<String>>,
    list_failure: Mutex<Option<ProviderErrorCode>>,
    calendars: Vec<(String, String)>,
}

impl MemoryCalendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the calendar with existing events.
    pub fn with_events(events: impl IntoIterator<Item = CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Registers a named calendar for [`CalendarService::resolve_calendar`].
    pub fn with_calendar(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.calendars.push((id.into(), name.into()));
        self
    }

    /// Makes any write targeting `event_id` fail.
    pub fn fail_writes_for(&self, event_id: impl Into<String>) {
        lock(&self.failing_ids).insert(event_id.into());
    }

    /// Makes listing fail with `code`.
    pub fn fail_listing(&self, code: ProviderErrorCode) {
        *lock(&self.list_failure) = Some(code);
    }

    /// Current events.
    pub fn events(&self) -> Vec<CalendarEvent> {
        lock(&self.events).clone()
    }

    /// Looks up an event by id.
    pub fn event(&self, id: &str) -> Option<CalendarEvent> {
        lock(&self.events).iter().find(|e| e.id == id).cloned()
    }

    /// Every write attempted so far, failed ones included.
    pub fn writes(&self) -> Vec<WriteCall> {
        lock(&self.writes).clone()
    }

    /// Number of attempted inserts.
    pub fn create_count(&self) -> usize {
        lock(&self.writes)
            .iter()
            .filter(|w| matches!(w, WriteCall::Create { .. }))
            .count()
    }

    /// Number of attempted patches.
    pub fn update_count(&self) -> usize {
        lock(&self.writes)
            .iter()
            .filter(|w| matches!(w, WriteCall::Update { .. }))
            .count()
    }

    /// Clears the write log, keeping events.
    pub fn clear_writes(&self) {
        lock(&self.writes).clear();
    }

    fn check_failure(&self, event_id: &str) -> ProviderResult<()> {
        if lock(&self.failing_ids).contains(event_id) {
            return Err(ProviderError::http(500, format!("injected failure for {}", event_id))
                .with_provider("memory"));
        }
        Ok(())
    }
}

impl CalendarService for MemoryCalendar {
    fn name(&self) -> &str {
        "memory"
    }

    fn resolve_calendar<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        let id = self
            .calendars
            .iter()
            .find(|(_, summary)| summary == name)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| PRIMARY_CALENDAR.to_string());
        Box::pin(async move { Ok(id) })
    }

    fn list_events<'a>(
        &'a self,
        _calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        let result = match *lock(&self.list_failure) {
            Some(code) => {
                Err(ProviderError::new(code, "injected listing failure").with_provider("memory"))
            }
            None => Ok(lock(&self.events)
                .iter()
                .filter(|e| match (e.start.to_utc(), e.end.to_utc()) {
                    (Some(start), Some(end)) => window.overlaps(start, end),
                    (Some(start), None) => window.contains(start),
                    (None, _) => true,
                })
                .cloned()
                .collect()),
        };
        Box::pin(async move { result })
    }

    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        payload: &'a EventPayload,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        lock(&self.writes).push(WriteCall::Create {
            calendar_id: calendar_id.to_string(),
            payload: payload.clone(),
        });

        let result = self.check_failure(&payload.id).and_then(|()| {
            let mut events = lock(&self.events);
            if events.iter().any(|e| e.id == payload.id) {
                return Err(ProviderError::http(409, "The requested identifier already exists.")
                    .with_provider("memory"));
            }
            events.push(CalendarEvent::from_payload(payload));
            Ok(())
        });
        Box::pin(async move { result })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        payload: &'a EventPayload,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        lock(&self.writes).push(WriteCall::Update {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
            payload: payload.clone(),
        });

        let result = self.check_failure(event_id).and_then(|()| {
            let mut events = lock(&self.events);
            match events.iter_mut().find(|e| e.id == event_id) {
                Some(event) => {
                    event.apply_patch(payload);
                    Ok(())
                }
                None => Err(ProviderError::not_found(format!("event {} not found", event_id))
                    .with_provider("memory")),
            }
        });
        Box::pin(async move { result })
    }
}

/// A contest source returning a fixed list, or a fixed error.
#[derive(Debug, Default)]
pub struct MemoryContests {
    contests: Vec<ContestRecord>,
    failure: Option<ProviderErrorCode>,
    calls: Mutex<usize>,
}

impl MemoryContests {
    /// A source that always yields `contests`.
    pub fn new(contests: impl IntoIterator<Item = ContestRecord>) -> Self {
        Self {
            contests: contests.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A source whose every fetch fails with `code`.
    pub fn failing(code: ProviderErrorCode) -> Self {
        Self {
            failure: Some(code),
            ..Self::default()
        }
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        *lock(&self.calls)
    }
}

impl ContestSource for MemoryContests {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_upcoming(&self, _window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<ContestRecord>>> {
        *lock(&self.calls) += 1;
        let result = match self.failure {
            Some(code) => Err(ProviderError::new(code, "injected fetch failure").with_provider("memory")),
            None => Ok(self.contests.clone()),
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use contestcal_core::{PayloadTime, Reminders};

    fn window() -> TimeWindow {
        TimeWindow::upcoming_days(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(), 7).unwrap()
    }

    fn payload(id: &str, summary: &str) -> EventPayload {
        EventPayload {
            id: id.to_string(),
            summary: summary.to_string(),
            start: PayloadTime {
                date_time: "2024-03-16T12:00:00.000000Z".to_string(),
            },
            end: PayloadTime {
                date_time: "2024-03-16T13:40:00.000000Z".to_string(),
            },
            reminders: Reminders::popup(30),
            source: None,
            description: None,
            color_id: "1".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let calendar = MemoryCalendar::new();
        calendar.create_event("primary", &payload("42", "ABC 345")).await.unwrap();

        let events = calendar.list_events("primary", window()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("ABC 345"));
        assert_eq!(calendar.create_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let calendar = MemoryCalendar::with_events([CalendarEvent::new("42")]);
        let err = calendar
            .create_event("primary", &payload("42", "ABC 345"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn update_missing_event_is_not_found() {
        let calendar = MemoryCalendar::new();
        let err = calendar
            .update_event("primary", "42", &payload("42", "ABC 345"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
        assert_eq!(calendar.update_count(), 1);
    }

    #[tokio::test]
    async fn injected_write_failure_is_recorded() {
        let calendar = MemoryCalendar::new();
        calendar.fail_writes_for("42");

        assert!(calendar.create_event("primary", &payload("42", "x")).await.is_err());
        assert!(calendar.create_event("primary", &payload("43", "y")).await.is_ok());
        assert_eq!(calendar.writes().len(), 2);
        assert!(calendar.event("42").is_none());
        assert!(calendar.event("43").is_some());
    }

    #[tokio::test]
    async fn listing_filters_by_window() {
        let calendar = MemoryCalendar::with_events([
            CalendarEvent::new("in").with_times("2024-03-16T12:00:00Z", "2024-03-16T13:00:00Z"),
            CalendarEvent::new("out").with_times("2024-04-16T12:00:00Z", "2024-04-16T13:00:00Z"),
            CalendarEvent::new("running").with_times("2024-03-14T22:00:00Z", "2024-03-15T02:00:00Z"),
            CalendarEvent::new("ended").with_times("2024-03-14T20:00:00Z", "2024-03-15T00:00:00Z"),
        ]);

        let events = calendar.list_events("primary", window()).await.unwrap();
        assert_eq!(
            events.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["in", "running"]
        );
    }

    #[tokio::test]
    async fn resolve_calendar_by_name() {
        let calendar = MemoryCalendar::new().with_calendar("abc@group.calendar.google.com", "Contests");
        assert_eq!(
            calendar.resolve_calendar("Contests").await.unwrap(),
            "abc@group.calendar.google.com"
        );
        assert_eq!(calendar.resolve_calendar("Other").await.unwrap(), PRIMARY_CALENDAR);
    }

    #[tokio::test]
    async fn failing_contest_source() {
        let source = MemoryContests::failing(ProviderErrorCode::NetworkError);
        let err = source.fetch_upcoming(window()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
        assert_eq!(source.calls(), 1);
    }
}
