//! Google Calendar API v3 client.
//!
//! Thin wrapper over reqwest: builds requests, maps HTTP failures to
//! [`ProviderError`], and follows `nextPageToken` on list endpoints.

use std::time::Duration;

use contestcal_core::{CalendarEvent, EventPayload, TimeWindow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Page size requested on list endpoints.
const PAGE_SIZE: u32 = 250;

/// Google Calendar API client bound to one access token.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

/// One page of a list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// An entry of the user's calendar list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    /// Calendar id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub summary: String,
    /// Whether this is the user's primary calendar.
    #[serde(default)]
    pub primary: bool,
}

impl GoogleCalendarClient {
    /// Creates a client for `base_url` (the API root, without trailing slash).
    pub fn new(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Replaces the access token after a refresh.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    fn calendar_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(calendar_id))
    }

    async fn check(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::http(status.as_u16(), body))
    }

    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(url)
                .bearer_auth(&self.access_token)
                .query(query)
                .query(&[("maxResults", PAGE_SIZE)]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = Self::check(request.send().await?).await?;
            let body = response.text().await?;
            let page: Page<T> = serde_json::from_str(&body).map_err(|e| {
                ProviderError::invalid_response(format!("failed to parse response: {}", e))
            })?;

            items.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(items)
    }

    /// Lists events starting inside `window`, all pages.
    pub async fn list_events(&self, calendar_id: &str, window: TimeWindow) -> ProviderResult<Vec<CalendarEvent>> {
        let query = [
            ("timeMin", window.start.to_rfc3339()),
            ("timeMax", window.end.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        let events: Vec<CalendarEvent> = self.get_all(&self.calendar_url(calendar_id), &query).await?;

        debug!(calendar_id, count = events.len(), "listed calendar events");
        Ok(events)
    }

    /// Lists the user's calendars, all pages.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarListEntry>> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        self.get_all(&url, &[]).await
    }

    /// Inserts an event.
    pub async fn insert_event(&self, calendar_id: &str, payload: &EventPayload) -> ProviderResult<()> {
        let request = self
            .http_client
            .post(self.calendar_url(calendar_id))
            .bearer_auth(&self.access_token)
            .json(payload);
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Patches an existing event.
    pub async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> ProviderResult<()> {
        let url = format!("{}/{}", self.calendar_url(calendar_id), urlencoding::encode(event_id));
        let request = self
            .http_client
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(payload);
        Self::check(request.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{TimeZone, Utc};
    use contestcal_core::{PayloadTime, Reminders};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new("ya29.test", server.uri(), Duration::from_secs(5), "contestcal-test").unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::upcoming_days(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(), 7).unwrap()
    }

    fn payload() -> EventPayload {
        EventPayload {
            id: "51234567".to_string(),
            summary: "Codeforces Round 930".to_string(),
            start: PayloadTime {
                date_time: "2024-03-16T14:35:00.000000Z".to_string(),
            },
            end: PayloadTime {
                date_time: "2024-03-16T16:35:00.000000Z".to_string(),
            },
            reminders: Reminders::popup(30),
            source: None,
            description: None,
            color_id: "1".to_string(),
        }
    }

    #[tokio::test]
    async fn list_events_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "2", "summary": "second"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer ya29.test"))
            .and(query_param("timeMin", "2024-03-15T00:00:00+00:00"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "1", "summary": "first"}],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let events = client(&server).list_events("primary", window()).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn list_events_without_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "calendar#events"
            })))
            .mount(&server)
            .await;

        let events = client(&server).list_events("primary", window()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn calendar_id_is_path_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/abc%40group.calendar.google.com/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .list_events("abc@group.calendar.google.com", window())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn insert_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(serde_json::json!({
                "id": "51234567",
                "colorId": "1",
                "reminders": {"useDefault": false, "overrides": [{"method": "popup", "minutes": 30}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "51234567"})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).insert_event("primary", &payload()).await.unwrap();
    }

    #[tokio::test]
    async fn patch_targets_event_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/calendars/primary/events/51234567"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "51234567"})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .patch_event("primary", "51234567", &payload())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn http_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let c = client(&server);
        let err = c.insert_event("primary", &payload()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::BadRequest);

        let err = c.list_calendars().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn malformed_list_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).list_events("primary", window()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[test]
    fn parse_calendar_list_entry() {
        let json = r#"{"id": "c@group.calendar.google.com", "summary": "Contests", "accessRole": "owner"}"#;
        let entry: CalendarListEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.summary, "Contests");
        assert!(!entry.primary);
    }
}
