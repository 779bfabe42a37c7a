//! Deciding and applying calendar writes.
//!
//! [`plan`] is pure: it pairs each contest with the first existing event
//! carrying its id and picks an action. [`apply`] executes the plan one
//! remote call at a time; a failed write is logged and counted, never
//! propagated, so one bad contest cannot stop the rest.

use std::fmt;

use contestcal_core::{CalendarEvent, ContestRecord, EventPayload, FavoriteHosts};
use contestcal_providers::CalendarService;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::compare::is_same_contest;
use crate::payload::build_payload;

/// What to do for one contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// No event carries the contest id.
    Create { payload: EventPayload },
    /// An event exists but differs.
    Update { event_id: String, payload: EventPayload },
    /// The event already mirrors the contest.
    Unchanged { id: String, title: String },
    /// The contest cannot be turned into an event.
    Invalid { id: String, reason: String },
}

impl SyncAction {
    /// The event id this action is about.
    pub fn id(&self) -> &str {
        match self {
            Self::Create { payload } => &payload.id,
            Self::Update { event_id, .. } => event_id,
            Self::Unchanged { id, .. } | Self::Invalid { id, .. } => id,
        }
    }

    /// True for actions that issue a remote call.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Create { .. } | Self::Update { .. })
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { payload } => write!(f, "create    {}  {}", payload.id, payload.summary),
            Self::Update { event_id, payload } => write!(f, "update    {}  {}", event_id, payload.summary),
            Self::Unchanged { id, title } => write!(f, "unchanged {}  {}", id, title),
            Self::Invalid { id, reason } => write!(f, "invalid   {}  {}", id, reason),
        }
    }
}

/// Counts of what a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Events inserted.
    pub created: usize,
    /// Events patched.
    pub updated: usize,
    /// Events already in sync.
    pub unchanged: usize,
    /// Contests whose write failed or that could not be converted.
    pub failed: usize,
}

impl SyncReport {
    /// Number of successful remote writes.
    pub fn writes(&self) -> usize {
        self.created + self.updated
    }

    /// Number of contests processed.
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.failed
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} failed",
            self.created, self.updated, self.unchanged, self.failed
        )
    }
}

/// Decides an action for every contest, in order.
pub fn plan(
    contests: &[ContestRecord],
    existing: &[CalendarEvent],
    favorites: &FavoriteHosts,
) -> Vec<SyncAction> {
    if existing.is_empty() {
        info!("no existing events, skipping duplicate check");
    }

    contests
        .iter()
        .map(|contest| {
            let id = contest.event_id();
            let payload = match build_payload(contest, favorites) {
                Ok(payload) => payload,
                Err(e) => {
                    return SyncAction::Invalid {
                        id,
                        reason: e.to_string(),
                    };
                }
            };

            match existing.iter().find(|event| event.id == id) {
                None => SyncAction::Create { payload },
                Some(event) if is_same_contest(contest, event) => SyncAction::Unchanged {
                    id,
                    title: contest.event.clone(),
                },
                Some(event) => SyncAction::Update {
                    event_id: event.id.clone(),
                    payload,
                },
            }
        })
        .collect()
}

/// Executes `actions` against `calendar_id`, one call at a time.
pub async fn apply(
    actions: &[SyncAction],
    service: &dyn CalendarService,
    calendar_id: &str,
) -> SyncReport {
    let mut report = SyncReport::default();

    for action in actions {
        match action {
            SyncAction::Create { payload } => {
                match service.create_event(calendar_id, payload).await {
                    Ok(()) => {
                        info!(id = %payload.id, title = %payload.summary, "event created");
                        report.created += 1;
                    }
                    Err(e) => {
                        error!(id = %payload.id, title = %payload.summary, error = %e, "failed to create event");
                        report.failed += 1;
                    }
                }
            }
            SyncAction::Update { event_id, payload } => {
                match service.update_event(calendar_id, event_id, payload).await {
                    Ok(()) => {
                        info!(id = %event_id, title = %payload.summary, "event updated");
                        report.updated += 1;
                    }
                    Err(e) => {
                        error!(id = %event_id, title = %payload.summary, error = %e, "failed to update event");
                        report.failed += 1;
                    }
                }
            }
            SyncAction::Unchanged { id, title } => {
                info!(%id, %title, "event already in sync");
                report.unchanged += 1;
            }
            SyncAction::Invalid { id, reason } => {
                warn!(%id, %reason, "skipping invalid contest");
                report.failed += 1;
            }
        }
    }

    report
}

/// [`plan`] followed by [`apply`].
pub async fn reconcile(
    contests: &[ContestRecord],
    existing: &[CalendarEvent],
    favorites: &FavoriteHosts,
    service: &dyn CalendarService,
    calendar_id: &str,
) -> SyncReport {
    let actions = plan(contests, existing, favorites);
    apply(&actions, service, calendar_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use contestcal_core::TimeWindow;
    use contestcal_providers::{MemoryCalendar, WriteCall};

    fn favorites() -> FavoriteHosts {
        FavoriteHosts::new(["codeforces.com", "atcoder.jp"])
    }

    fn window() -> TimeWindow {
        TimeWindow::upcoming_days(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap(), 7).unwrap()
    }

    fn codeforces() -> ContestRecord {
        ContestRecord::new(51234567, "Codeforces Round 930", "2024-03-16T14:35:00", "2024-03-16T16:35:00")
            .with_host("codeforces.com")
            .with_href("https://codeforces.com/contests/1937")
    }

    fn atcoder() -> ContestRecord {
        ContestRecord::new(51234999, "ABC 345", "2024-03-16T12:00:00", "2024-03-16T13:40:00")
            .with_host("atcoder.jp")
            .with_href("https://atcoder.jp/contests/abc345")
    }

    fn mirrored(contest: &ContestRecord) -> CalendarEvent {
        CalendarEvent::from_payload(&build_payload(contest, &favorites()).unwrap())
    }

    #[tokio::test]
    async fn empty_calendar_creates_everything() {
        let calendar = MemoryCalendar::new();
        let contests = [codeforces(), atcoder()];

        let report = reconcile(&contests, &[], &favorites(), &calendar, "primary").await;

        assert_eq!(report.created, 2);
        assert_eq!(calendar.create_count(), 2);
        assert_eq!(calendar.update_count(), 0);

        let WriteCall::Create { calendar_id, payload } = &calendar.writes()[1] else {
            panic!("expected a create");
        };
        assert_eq!(calendar_id, "primary");
        assert_eq!(payload.summary, "ABC 345");
        assert_eq!(payload.description.as_deref(), Some("https://atcoder.jp/contests/abc345"));
        assert_eq!(payload.color_id, "2");
    }

    #[tokio::test]
    async fn in_sync_events_are_left_alone() {
        let existing = vec![mirrored(&codeforces())];
        let calendar = MemoryCalendar::with_events(existing.clone());

        let report = reconcile(&[codeforces()], &existing, &favorites(), &calendar, "primary").await;

        assert_eq!(report, SyncReport { unchanged: 1, ..Default::default() });
        assert!(calendar.writes().is_empty());
    }

    #[tokio::test]
    async fn stale_event_is_patched_by_id() {
        let mut stale = mirrored(&codeforces());
        stale.end.date_time = Some("2024-03-16T16:05:00Z".to_string());
        let calendar = MemoryCalendar::with_events([stale.clone()]);

        let report = reconcile(&[codeforces()], &[stale], &favorites(), &calendar, "primary").await;

        assert_eq!(report.updated, 1);
        assert_eq!(calendar.create_count(), 0);
        assert_eq!(calendar.writes()[0].event_id(), "51234567");
        assert_eq!(
            calendar.event("51234567").unwrap().end.date_time.as_deref(),
            Some("2024-03-16T16:35:00.000000Z")
        );
    }

    #[tokio::test]
    async fn missing_href_patches_instead_of_failing() {
        let mut contest = codeforces();
        contest.href = None;
        let existing = vec![mirrored(&contest)];
        let calendar = MemoryCalendar::with_events(existing.clone());

        let report = reconcile(&[contest], &existing, &favorites(), &calendar, "primary").await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn one_failing_create_does_not_stop_the_rest() {
        let calendar = MemoryCalendar::new();
        calendar.fail_writes_for("51234567");

        let report = reconcile(&[codeforces(), atcoder()], &[], &favorites(), &calendar, "primary").await;

        assert_eq!(report, SyncReport { created: 1, failed: 1, ..Default::default() });
        assert_eq!(calendar.writes().len(), 2);
        assert!(calendar.event("51234999").is_some());
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let calendar = MemoryCalendar::new();
        let contests = [codeforces(), atcoder()];

        reconcile(&contests, &[], &favorites(), &calendar, "primary").await;
        calendar.clear_writes();

        let existing = calendar.list_events("primary", window()).await.unwrap();
        let report = reconcile(&contests, &existing, &favorites(), &calendar, "primary").await;

        assert_eq!(report.unchanged, 2);
        assert!(calendar.writes().is_empty());
    }

    #[test]
    fn first_matching_event_wins() {
        let contest = codeforces();
        let stale = CalendarEvent::new("51234567").with_summary("old");
        let fresh = mirrored(&contest);

        let actions = plan(&[contest], &[stale, fresh], &favorites());
        assert!(matches!(&actions[0], SyncAction::Update { event_id, .. } if event_id == "51234567"));
    }

    #[test]
    fn malformed_contest_is_planned_as_invalid() {
        let mut broken = atcoder();
        broken.start = "tomorrow".to_string();

        let actions = plan(&[broken, codeforces()], &[], &favorites());
        assert!(matches!(&actions[0], SyncAction::Invalid { id, .. } if id == "51234999"));
        assert!(matches!(&actions[1], SyncAction::Create { .. }));
        assert!(!actions[0].is_write());
    }

    #[tokio::test]
    async fn invalid_actions_count_as_failed_without_calls() {
        let calendar = MemoryCalendar::new();
        let actions = vec![SyncAction::Invalid {
            id: "1".to_string(),
            reason: "unparsable start".to_string(),
        }];

        let report = apply(&actions, &calendar, "primary").await;
        assert_eq!(report.failed, 1);
        assert!(calendar.writes().is_empty());
    }

    #[test]
    fn report_display() {
        let report = SyncReport {
            created: 2,
            updated: 1,
            unchanged: 4,
            failed: 0,
        };
        assert_eq!(report.to_string(), "2 created, 1 updated, 4 unchanged, 0 failed");
        assert_eq!(report.writes(), 3);
        assert_eq!(report.total(), 7);
    }
}
