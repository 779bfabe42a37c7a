//! One sync run: fetch, resolve calendar, list, reconcile.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use contestcal_core::{FavoriteHosts, TimeWindow};
use contestcal_providers::{CalendarService, ContestSource};
use tracing::{error, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::reconcile::{SyncAction, SyncReport, apply, plan};

/// Default look-ahead, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Longest accepted look-ahead, in days.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Settings for a [`SyncRunner`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Hosts ranked for color assignment.
    pub favorites: FavoriteHosts,
    /// Display name of the target calendar.
    pub calendar_name: String,
    /// Look-ahead, in days.
    pub window_days: u32,
}

impl SyncConfig {
    /// Calendar name used when none is configured.
    pub const DEFAULT_CALENDAR_NAME: &'static str = "Programming";

    /// Creates a configuration with the default calendar and window.
    pub fn new(favorites: FavoriteHosts) -> Self {
        Self {
            favorites,
            calendar_name: Self::DEFAULT_CALENDAR_NAME.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Sets the target calendar name.
    pub fn with_calendar_name(mut self, name: impl Into<String>) -> Self {
        self.calendar_name = name.into();
        self
    }

    /// Sets the look-ahead.
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// The window starting today at 00:00 UTC.
    ///
    /// Fails unless `window_days` is between 1 and [`MAX_WINDOW_DAYS`].
    pub fn window(&self, now: DateTime<Utc>) -> SyncResult<TimeWindow> {
        let days = self.window_days;
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(SyncError::InvalidWindow { days });
        }
        TimeWindow::upcoming_days(now, days).ok_or(SyncError::InvalidWindow { days })
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Contests could not be fetched; nothing was written.
    Skipped { reason: String },
    /// Reconciliation ran.
    Completed(SyncReport),
}

/// A computed plan that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPreview {
    /// Contests could not be fetched.
    Skipped { reason: String },
    /// Actions a run would take against `calendar_id`.
    Planned {
        calendar_id: String,
        actions: Vec<SyncAction>,
    },
}

/// Wires a contest source to a calendar.
pub struct SyncRunner {
    source: Arc<dyn ContestSource>,
    calendar: Arc<dyn CalendarService>,
    config: SyncConfig,
}

impl SyncRunner {
    /// Creates a runner.
    pub fn new(
        source: Arc<dyn ContestSource>,
        calendar: Arc<dyn CalendarService>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            calendar,
            config,
        }
    }

    /// Returns the runner configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetches contests, resolves the calendar and lists existing events,
    /// then plans. `None` means the fetch failed.
    async fn prepare(&self, window: TimeWindow) -> SyncResult<Option<(String, Vec<SyncAction>)>> {
        let contests = match self.source.fetch_upcoming(window).await {
            Ok(contests) => contests,
            Err(e) => {
                error!(source = self.source.name(), error = %e, "failed to fetch contests, skipping run");
                return Ok(None);
            }
        };
        info!(count = contests.len(), "contests to sync");

        let calendar_id = self.calendar.resolve_calendar(&self.config.calendar_name).await?;

        let existing = match self.calendar.list_events(&calendar_id, window).await {
            Ok(events) => events,
            Err(e) => {
                warn!(calendar_id, error = %e, "failed to list existing events, treating calendar as empty");
                Vec::new()
            }
        };

        let actions = plan(&contests, &existing, &self.config.favorites);
        Ok(Some((calendar_id, actions)))
    }

    /// Runs one sync over `window`.
    ///
    /// # Errors
    ///
    /// Only calendar resolution errors propagate. A failed fetch yields
    /// [`SyncOutcome::Skipped`]; write failures are counted in the report.
    pub async fn run(&self, window: TimeWindow) -> SyncResult<SyncOutcome> {
        let Some((calendar_id, actions)) = self.prepare(window).await? else {
            return Ok(SyncOutcome::Skipped {
                reason: "contest fetch failed".to_string(),
            });
        };

        let report = apply(&actions, self.calendar.as_ref(), &calendar_id).await;
        info!(calendar_id, %report, "sync finished");
        Ok(SyncOutcome::Completed(report))
    }

    /// Computes what [`run`](Self::run) would do without writing.
    pub async fn preview(&self, window: TimeWindow) -> SyncResult<SyncPreview> {
        Ok(match self.prepare(window).await? {
            Some((calendar_id, actions)) => SyncPreview::Planned {
                calendar_id,
                actions,
            },
            None => SyncPreview::Skipped {
                reason: "contest fetch failed".to_string(),
            },
        })
    }
}
