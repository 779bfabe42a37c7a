//! Calendar-side event types.
//!
//! [`CalendarEvent`] is what the calendar service lists back; every field it
//! carries may be absent, so they are all optional. [`EventPayload`] is the
//! body written on insert and patch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_rfc3339;

/// Start or end of a listed event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 timestamp with offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// IANA timezone of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// Creates a timed value from an RFC 3339 string.
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            date_time: Some(value.into()),
            ..Default::default()
        }
    }

    /// Parses the timed value into a UTC instant.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_time.as_deref().and_then(parse_rfc3339)
    }
}

/// An event already present in the target calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Calendar event identifier.
    pub id: String,
    /// Event title.
    #[serde(default)]
    pub summary: Option<String>,
    /// Event description; synced events carry the contest URL here.
    #[serde(default)]
    pub description: Option<String>,
    /// Event start.
    #[serde(default)]
    pub start: EventDateTime,
    /// Event end.
    #[serde(default)]
    pub end: EventDateTime,
}

impl CalendarEvent {
    /// Creates an event with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set RFC 3339 start and end.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = EventDateTime::date_time(start);
        self.end = EventDateTime::date_time(end);
        self
    }

    /// Builds the event a calendar would hold after writing `payload`.
    pub fn from_payload(payload: &EventPayload) -> Self {
        Self {
            id: payload.id.clone(),
            summary: Some(payload.summary.clone()),
            description: payload.description.clone(),
            start: EventDateTime::date_time(&payload.start.date_time),
            end: EventDateTime::date_time(&payload.end.date_time),
        }
    }

    /// Overlays a patch body onto this event.
    pub fn apply_patch(&mut self, payload: &EventPayload) {
        self.summary = Some(payload.summary.clone());
        if payload.description.is_some() {
            self.description = payload.description.clone();
        }
        self.start = EventDateTime::date_time(&payload.start.date_time);
        self.end = EventDateTime::date_time(&payload.end.date_time);
    }
}

/// Timestamp wrapper used in payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadTime {
    /// UTC timestamp, `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
    pub date_time: String,
}

/// A single reminder override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    /// Delivery method (`popup`, `email`).
    pub method: String,
    /// Minutes before the event start.
    pub minutes: u32,
}

/// Reminder settings of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    /// Whether the calendar's default reminders apply.
    pub use_default: bool,
    /// Explicit reminders.
    pub overrides: Vec<ReminderOverride>,
}

impl Reminders {
    /// A single popup reminder `minutes` before start.
    pub fn popup(minutes: u32) -> Self {
        Self {
            use_default: false,
            overrides: vec![ReminderOverride {
                method: "popup".to_string(),
                minutes,
            }],
        }
    }
}

/// Source link shown on the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    /// Source URL.
    pub url: String,
    /// Source title.
    pub title: String,
}

/// Body of an insert or patch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Event id (the contest id as a string).
    pub id: String,
    /// Event title.
    pub summary: String,
    /// Event start.
    pub start: PayloadTime,
    /// Event end.
    pub end: PayloadTime,
    /// Reminder settings.
    pub reminders: Reminders,
    /// Link back to the contest page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EventSource>,
    /// Event description (the contest URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Calendar color id, `"1"`..`"11"`.
    pub color_id: String,
}
