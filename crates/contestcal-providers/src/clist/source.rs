//! [`ContestSource`] backed by the clist.by API.

use contestcal_core::{ContestRecord, FavoriteHosts, TimeWindow, format_query_bound};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::service::{BoxFuture, ContestSource};

use super::config::ClistConfig;
use super::response::ContestListResponse;

/// Fetches upcoming contests and keeps those hosted on a favorite site.
#[derive(Debug)]
pub struct ClistSource {
    config: ClistConfig,
    favorites: FavoriteHosts,
    http_client: reqwest::Client,
}

impl ClistSource {
    /// Creates a source filtering on `favorites`.
    pub fn new(config: ClistConfig, favorites: FavoriteHosts) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("contestcal/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            favorites,
            http_client,
        })
    }

    /// Fetches every contest in `window`, unfiltered, in API order.
    pub async fn fetch_all(&self, window: TimeWindow) -> ProviderResult<Vec<ContestRecord>> {
        let start = format_query_bound(&window.start);
        let end = format_query_bound(&window.end);
        debug!(%start, %end, "querying clist");

        let response = self
            .http_client
            .get(self.config.contest_url())
            .query(&[
                ("username", self.config.username.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("format", "json"),
                // The API spells it this way.
                ("upcomming", "true"),
                ("order_by", "start"),
                ("start__gt", start.as_str()),
                ("start__lt", end.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::http(status.as_u16(), body));
        }

        let body = response.text().await?;
        let parsed: ContestListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("unexpected contest list shape: {}", e))
        })?;

        if let Some(ref next) = parsed.meta.next {
            warn!(next, total = ?parsed.meta.total_count, "contest list is paginated, only the first page is used");
        }

        Ok(parsed.objects.into_vec())
    }

    fn keep_favorites(&self, contests: Vec<ContestRecord>) -> Vec<ContestRecord> {
        contests
            .into_iter()
            .filter(|contest| {
                let keep = contest
                    .host
                    .as_deref()
                    .is_some_and(|host| self.favorites.matches(host));
                if !keep {
                    debug!(id = contest.id, host = ?contest.host, "dropping contest from non-favorite host");
                }
                keep
            })
            .collect()
    }

    async fn fetch(&self, window: TimeWindow) -> ProviderResult<Vec<ContestRecord>> {
        let all = self.fetch_all(window).await?;
        let total = all.len();
        let contests = self.keep_favorites(all);
        info!(total, kept = contests.len(), "fetched upcoming contests");
        Ok(contests)
    }
}

impl ContestSource for ClistSource {
    fn name(&self) -> &str {
        "clist"
    }

    fn fetch_upcoming(&self, window: TimeWindow) -> BoxFuture<'_, ProviderResult<Vec<ContestRecord>>> {
        Box::pin(async move { self.fetch(window).await.map_err(|e| e.with_provider("clist")) })
    }
}
