//! Field-level comparison of a contest and its calendar event.

use chrono::{DateTime, Utc};
use contestcal_core::{CalendarEvent, ContestRecord, EventDateTime};
use tracing::{debug, info};

/// Returns true when `event` mirrors `contest` exactly: same id, title,
/// URL, start and end instant.
///
/// Every field is checked and every mismatch is logged, so one call shows
/// all the reasons an event is stale. A key missing on either side or a
/// timestamp that does not parse counts as a mismatch.
pub fn is_same_contest(contest: &ContestRecord, event: &CalendarEvent) -> bool {
    let checks = [
        same_id(contest, event),
        same_title(contest, event),
        same_description(contest, event),
        same_instant("start", &contest.start, contest.start_utc(), &event.start),
        same_instant("end", &contest.end, contest.end_utc(), &event.end),
    ];
    checks.iter().all(|ok| *ok)
}

fn same_id(contest: &ContestRecord, event: &CalendarEvent) -> bool {
    let id = contest.event_id();
    if id != event.id {
        info!(contest = %id, existing = %event.id, "id mismatch");
        return false;
    }
    true
}

fn same_title(contest: &ContestRecord, event: &CalendarEvent) -> bool {
    match event.summary.as_deref() {
        None => {
            debug!(id = contest.id, "existing event has no summary");
            false
        }
        Some(summary) if summary != contest.event => {
            info!(contest = %contest.event, existing = summary, "title mismatch");
            false
        }
        Some(_) => true,
    }
}

fn same_description(contest: &ContestRecord, event: &CalendarEvent) -> bool {
    match (contest.href.as_deref(), event.description.as_deref()) {
        (Some(href), Some(description)) if href == description => true,
        (Some(href), Some(description)) => {
            info!(contest = href, existing = description, "description mismatch");
            false
        }
        (None, _) => {
            debug!(id = contest.id, "contest has no href");
            false
        }
        (_, None) => {
            debug!(id = contest.id, "existing event has no description");
            false
        }
    }
}

fn same_instant(
    field: &str,
    raw: &str,
    contest: Option<DateTime<Utc>>,
    existing: &EventDateTime,
) -> bool {
    let Some(contest) = contest else {
        debug!(field, value = raw, "contest timestamp does not parse");
        return false;
    };
    let Some(existing) = existing.to_utc() else {
        debug!(field, value = ?existing.date_time, "existing event has no usable dateTime");
        return false;
    };
    if contest != existing {
        info!(field, contest = %contest, existing = %existing, "time mismatch");
        return false;
    }
    true
}
