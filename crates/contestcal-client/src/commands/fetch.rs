//! `contestcal fetch`: show what a sync would work from.

use std::fmt::Write as _;

use chrono::Utc;
use contestcal_core::{ContestRecord, FavoriteHosts, TimeWindow, compute_color};
use contestcal_providers::ContestSource;

use super::clist_source;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Fetches favorite-host contests in the window and prints them.
pub async fn run(config: &ClientConfig, days: Option<u32>, json: bool) -> ClientResult<()> {
    config.validate()?;

    let source = clist_source(config)?;
    let window = config.sync_config(days).window(Utc::now())?;
    let contests = list(&source, window).await?;

    print!("{}", render(&contests, &config.favorites(), json)?);
    Ok(())
}

pub(crate) async fn list(
    source: &dyn ContestSource,
    window: TimeWindow,
) -> ClientResult<Vec<ContestRecord>> {
    Ok(source.fetch_upcoming(window).await?)
}

pub(crate) fn render(
    contests: &[ContestRecord],
    favorites: &FavoriteHosts,
    json: bool,
) -> ClientResult<String> {
    if json {
        let mut out = serde_json::to_string_pretty(contests)
            .map_err(|e| ClientError::config(format!("failed to encode contests: {}", e)))?;
        out.push('\n');
        return Ok(out);
    }

    if contests.is_empty() {
        return Ok("No upcoming contests on favorite hosts.\n".to_string());
    }

    let mut out = String::new();
    for contest in contests {
        let _ = writeln!(
            out,
            "{:<19}  {:>2}  {:<16}  {}",
            contest.start,
            compute_color(contest.host.as_deref(), favorites),
            contest.host.as_deref().unwrap_or("-"),
            contest.event
        );
    }
    Ok(out)
}
