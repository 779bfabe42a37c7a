//! Time handling for contest listings and calendar events.
//!
//! Contests arrive from the aggregator as naive timestamps that are
//! implicitly UTC (`2024-03-15T14:35:00`). Calendar events carry RFC 3339
//! timestamps with an explicit offset. Both sides are normalized to
//! [`DateTime<Utc>`] so they can be compared as instants.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Accepted layouts for naive contest timestamps, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a naive timestamp and localizes it to UTC.
///
/// Returns `None` if the string matches none of the accepted layouts.
pub fn parse_naive_utc(value: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Parses an RFC 3339 timestamp with offset and converts it to UTC.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats a UTC instant the way event payloads carry it:
/// `2024-03-15T14:35:00.000000Z`.
pub fn format_utc_micros(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Formats a window bound for the aggregator query (`YYYY-MM-DD HH:MM`).
pub fn format_query_bound(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// A time window for querying contests and calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window starting at midnight UTC of `now`'s day and
    /// spanning `days` days.
    ///
    /// Returns `None` when the end falls outside the representable range.
    pub fn upcoming_days(now: DateTime<Utc>, days: u32) -> Option<Self> {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start.checked_add_signed(Duration::try_days(i64::from(days))?)?;
        Some(Self { start, end })
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        dt >= self.start && dt < self.end
    }

    /// Returns `true` if `[start, end)` shares any instant with the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        end > self.start && start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_naive_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 14, 35, 0).unwrap();
        assert_eq!(parse_naive_utc("2024-03-15T14:35:00"), Some(expected));
        assert_eq!(parse_naive_utc("2024-03-15T14:35:00.000000"), Some(expected));
        assert_eq!(parse_naive_utc("2024-03-15 14:35:00"), Some(expected));
        assert_eq!(parse_naive_utc("15/03/2024"), None);
        assert_eq!(parse_naive_utc(""), None);
    }

    #[test]
    fn parse_rfc3339_normalizes_offset() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 14, 35, 0).unwrap();
        assert_eq!(parse_rfc3339("2024-03-15T14:35:00Z"), Some(expected));
        assert_eq!(parse_rfc3339("2024-03-15T21:35:00+07:00"), Some(expected));
        assert_eq!(parse_rfc3339("2024-03-15T14:35:00.000000Z"), Some(expected));
        assert_eq!(parse_rfc3339("2024-03-15T14:35:00"), None);
    }

    #[test]
    fn naive_and_offset_forms_agree() {
        let naive = parse_naive_utc("2024-03-15T14:35:00").unwrap();
        let aware = parse_rfc3339("2024-03-15T16:35:00+02:00").unwrap();
        assert_eq!(naive, aware);
    }

    #[test]
    fn format_payload_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 14, 35, 0).unwrap();
        assert_eq!(format_utc_micros(&dt), "2024-03-15T14:35:00.000000Z");
        assert_eq!(parse_rfc3339(&format_utc_micros(&dt)), Some(dt));
    }

    #[test]
    fn format_bound_for_query() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(format_query_bound(&dt), "2024-03-15 00:00");
    }

    #[test]
    fn upcoming_window_starts_at_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 17, 42, 9).unwrap();
        let window = TimeWindow::upcoming_days(now, 7).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 22, 0, 0, 0).unwrap());
        assert_eq!(window.duration(), Duration::days(7));
        assert!(window.contains(now));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn overlap_is_half_open() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let window = TimeWindow::upcoming_days(now, 1).unwrap();
        let at = |h| Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap() + Duration::hours(h);

        assert!(window.overlaps(at(-2), at(1)));
        assert!(window.overlaps(at(23), at(26)));
        assert!(!window.overlaps(at(-2), at(0)));
        assert!(!window.overlaps(at(24), at(26)));
    }

    #[test]
    fn oversized_window_is_none() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap();
        assert!(TimeWindow::upcoming_days(now, 100_000_000).is_none());
        assert!(TimeWindow::upcoming_days(now, u32::MAX).is_none());
        assert!(TimeWindow::upcoming_days(now, 366).is_some());
    }

    #[test]
    #[should_panic(expected = "TimeWindow start must be <= end")]
    fn window_rejects_inverted_bounds() {
        let now = Utc::now();
        TimeWindow::new(now, now - Duration::hours(1));
    }
}
