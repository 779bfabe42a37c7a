//! Core types: contests, calendar events, favorite hosts, time, tracing

pub mod contest;
pub mod event;
pub mod hosts;
pub mod logging;
pub mod time;

pub use contest::ContestRecord;
pub use event::{
    CalendarEvent, EventDateTime, EventPayload, EventSource, PayloadTime, ReminderOverride,
    Reminders,
};
pub use hosts::{DEFAULT_COLOR_ID, FavoriteHosts, compute_color};
pub use logging::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use time::{TimeWindow, format_query_bound, format_utc_micros, parse_naive_utc, parse_rfc3339};
