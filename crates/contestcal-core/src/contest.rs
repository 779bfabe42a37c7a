//! Contest records as listed by the aggregator API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::parse_naive_utc;

/// One upcoming contest.
///
/// Timestamps are kept exactly as the aggregator sent them (naive, UTC)
/// and parsed on demand, so a malformed value surfaces at comparison or
/// payload time instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestRecord {
    /// Aggregator identifier, reused as the calendar event id.
    pub id: i64,
    /// Hosting domain, e.g. `codeforces.com`.
    #[serde(default)]
    pub host: Option<String>,
    /// Contest title.
    pub event: String,
    /// Naive UTC start, e.g. `2024-03-15T14:35:00`.
    pub start: String,
    /// Naive UTC end.
    pub end: String,
    /// Contest page URL.
    #[serde(default)]
    pub href: Option<String>,
    /// Aggregator resource name.
    #[serde(default)]
    pub resource: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<i64>,
}

impl ContestRecord {
    /// Creates a contest record with the required fields.
    pub fn new(
        id: i64,
        event: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            id,
            host: None,
            event: event.into(),
            start: start.into(),
            end: end.into(),
            href: None,
            resource: None,
            duration: None,
        }
    }

    /// Builder method to set the hosting domain.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Builder method to set the contest URL.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// The identifier as the calendar sees it.
    pub fn event_id(&self) -> String {
        self.id.to_string()
    }

    /// Start instant, if the timestamp parses.
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        parse_naive_utc(&self.start)
    }

    /// End instant, if the timestamp parses.
    pub fn end_utc(&self) -> Option<DateTime<Utc>> {
        parse_naive_utc(&self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deserialize_aggregator_object() {
        let json = r#"{
            "id": 51234567,
            "resource": "codeforces.com",
            "resource_id": 1,
            "host": "codeforces.com",
            "event": "Codeforces Round 930 (Div. 2)",
            "start": "2024-03-15T14:35:00",
            "end": "2024-03-15T16:35:00",
            "parsed_at": "2024-03-10T01:02:03",
            "duration": 7200,
            "href": "https://codeforces.com/contests/1937",
            "problems": null
        }"#;

        let contest: ContestRecord = serde_json::from_str(json).unwrap();
        assert_eq!(contest.id, 51234567);
        assert_eq!(contest.host.as_deref(), Some("codeforces.com"));
        assert_eq!(contest.event, "Codeforces Round 930 (Div. 2)");
        assert_eq!(contest.duration, Some(7200));
        assert_eq!(
            contest.href.as_deref(),
            Some("https://codeforces.com/contests/1937")
        );
    }

    #[test]
    fn deserialize_without_optional_fields() {
        let json = r#"{
            "id": 7,
            "event": "Weekly Contest",
            "start": "2024-03-17T02:30:00",
            "end": "2024-03-17T04:00:00"
        }"#;

        let contest: ContestRecord = serde_json::from_str(json).unwrap();
        assert!(contest.host.is_none());
        assert!(contest.href.is_none());
    }

    #[test]
    fn deserialize_rejects_missing_title() {
        let json = r#"{"id": 7, "start": "2024-03-17T02:30:00", "end": "2024-03-17T04:00:00"}"#;
        assert!(serde_json::from_str::<ContestRecord>(json).is_err());
    }

    #[test]
    fn instants_and_id() {
        let contest = ContestRecord::new(42, "ABC 345", "2024-03-16T12:00:00", "2024-03-16T13:40:00")
            .with_host("atcoder.jp")
            .with_href("https://atcoder.jp/contests/abc345");

        assert_eq!(contest.event_id(), "42");
        assert_eq!(
            contest.start_utc(),
            Some(Utc.with_ymd_and_hms(2024, 3, 16, 12, 0, 0).unwrap())
        );
        assert_eq!(
            contest.end_utc(),
            Some(Utc.with_ymd_and_hms(2024, 3, 16, 13, 40, 0).unwrap())
        );
    }

    #[test]
    fn malformed_timestamp_yields_none() {
        let contest = ContestRecord::new(1, "Broken", "soon", "later");
        assert!(contest.start_utc().is_none());
        assert!(contest.end_utc().is_none());
    }
}
