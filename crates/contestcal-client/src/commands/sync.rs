//! `contestcal sync`.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Utc;
use contestcal_core::TimeWindow;
use contestcal_sync::{SyncOutcome, SyncPreview, SyncResult, SyncRunner};
use tracing::{info, warn};

use super::{clist_source, google_calendar};
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs one sync, or prints the plan with `dry_run`.
///
/// A skipped run and per-contest write failures still return `Ok`; the log
/// has the details.
pub async fn run(config: &ClientConfig, dry_run: bool, days: Option<u32>) -> ClientResult<()> {
    config.validate()?;

    let source = clist_source(config)?;
    let calendar = google_calendar(config)?;
    let runner = SyncRunner::new(Arc::new(source), Arc::new(calendar), config.sync_config(days));
    let window = runner.config().window(Utc::now())?;
    info!(start = %window.start, end = %window.end, dry_run, "starting sync");

    print!("{}", execute(&runner, window, dry_run).await?);
    Ok(())
}

/// Runs or previews and renders the result for the terminal.
pub(crate) async fn execute(
    runner: &SyncRunner,
    window: TimeWindow,
    dry_run: bool,
) -> SyncResult<String> {
    if dry_run {
        return Ok(render_preview(&runner.preview(window).await?));
    }
    let outcome = runner.run(window).await?;
    if let SyncOutcome::Skipped { ref reason } = outcome {
        warn!(%reason, "sync skipped");
    }
    Ok(render_outcome(&outcome))
}

fn render_preview(preview: &SyncPreview) -> String {
    match preview {
        SyncPreview::Skipped { reason } => format!("Nothing to plan: {}\n", reason),
        SyncPreview::Planned {
            calendar_id,
            actions,
        } => {
            let mut out = format!("Planned changes for {}:\n", calendar_id);
            if actions.is_empty() {
                out.push_str("  (no contests)\n");
            }
            for action in actions {
                let _ = writeln!(out, "  {}", action);
            }
            let writes = actions.iter().filter(|a| a.is_write()).count();
            let _ = writeln!(out, "{} of {} contests need a write", writes, actions.len());
            out
        }
    }
}

fn render_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Skipped { reason } => format!("Sync skipped: {}\n", reason),
        SyncOutcome::Completed(report) => format!("Sync finished: {}\n", report),
    }
}
