//! Insert/patch bodies built from contests.

use contestcal_core::{
    ContestRecord, EventPayload, EventSource, FavoriteHosts, PayloadTime, Reminders, compute_color,
    format_utc_micros,
};

use crate::error::{SyncError, SyncResult};

/// Popup reminder lead time, in minutes.
pub const REMINDER_MINUTES: u32 = 30;

/// Builds the event body mirroring `contest`.
///
/// The contest URL becomes both the description and the event source;
/// both are omitted when the contest has no URL.
///
/// # Errors
///
/// [`SyncError::InvalidContest`] when start or end does not parse.
pub fn build_payload(contest: &ContestRecord, favorites: &FavoriteHosts) -> SyncResult<EventPayload> {
    let start = contest.start_utc().ok_or_else(|| {
        SyncError::invalid_contest(contest.id, format!("unparsable start '{}'", contest.start))
    })?;
    let end = contest.end_utc().ok_or_else(|| {
        SyncError::invalid_contest(contest.id, format!("unparsable end '{}'", contest.end))
    })?;

    let source = contest.href.as_ref().map(|href| EventSource {
        url: href.clone(),
        title: contest.event.clone(),
    });

    Ok(EventPayload {
        id: contest.event_id(),
        summary: contest.event.clone(),
        start: PayloadTime {
            date_time: format_utc_micros(&start),
        },
        end: PayloadTime {
            date_time: format_utc_micros(&end),
        },
        reminders: Reminders::popup(REMINDER_MINUTES),
        source,
        description: contest.href.clone(),
        color_id: compute_color(contest.host.as_deref(), favorites).to_string(),
    })
}
