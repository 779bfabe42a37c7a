//! [`CalendarService`] backed by Google Calendar.

use tokio::sync::RwLock as TokioRwLock;
use tracing::{debug, error, info};

use contestcal_core::{CalendarEvent, EventPayload, TimeWindow};

use crate::error::{ProviderError, ProviderResult};
use crate::service::{BoxFuture, CalendarService, PRIMARY_CALENDAR};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::TokenStorage;

/// Google Calendar access with token refresh.
///
/// Construction loads the persisted token but never opens a browser; call
/// [`authenticate`](Self::authenticate) for that.
pub struct GoogleCalendar {
    config: GoogleConfig,
    token_storage: TokenStorage,
    oauth_client: OAuthClient,
    api_client: TokioRwLock<Option<GoogleCalendarClient>>,
}

impl GoogleCalendar {
    /// Creates the service and loads any stored token.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        let token_storage = TokenStorage::new(&config.token_path);
        token_storage.load()?;
        let oauth_client = OAuthClient::new(&config)?;

        Ok(Self {
            config,
            token_storage,
            oauth_client,
            api_client: TokioRwLock::new(None),
        })
    }

    /// Runs the browser consent flow and stores the resulting token.
    pub async fn authenticate(&self) -> ProviderResult<()> {
        info!("starting Google authentication flow");
        let tokens = self
            .oauth_client
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await?;
        self.token_storage.set(tokens)?;
        *self.api_client.write().await = None;

        info!(path = %self.token_storage.path().display(), "Google authentication stored");
        Ok(())
    }

    /// Forgets the stored token.
    pub fn sign_out(&self) -> ProviderResult<()> {
        self.token_storage.clear()
    }

    /// True when no token is stored or it lacks the configured scopes.
    pub fn needs_reauth(&self) -> bool {
        self.token_storage.needs_reauth(&self.config.scopes)
    }

    /// True when the stored token is usable now or can be refreshed.
    pub fn is_authenticated(&self) -> bool {
        self.token_storage.has_valid_tokens() || self.token_storage.has_refresh_token()
    }

    fn new_client(&self, access_token: &str) -> ProviderResult<GoogleCalendarClient> {
        GoogleCalendarClient::new(
            access_token,
            &self.config.api_base_url,
            self.config.timeout,
            &self.config.user_agent,
        )
    }

    /// Makes sure an API client exists with an unexpired token.
    async fn ensure_client(&self) -> ProviderResult<()> {
        let tokens = self.token_storage.get().ok_or_else(|| {
            ProviderError::authentication("not authenticated, run 'contestcal auth google'")
        })?;

        if !tokens.is_expired() {
            let mut client = self.api_client.write().await;
            if client.is_none() {
                *client = Some(self.new_client(&tokens.access_token)?);
            }
            return Ok(());
        }

        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            ProviderError::authentication("token expired and no refresh token, run 'contestcal auth google'")
        })?;

        debug!("refreshing expired access token");
        let (access_token, expires_in) = self.oauth_client.refresh_token(refresh_token).await?;
        self.token_storage.update_access_token(&access_token, expires_in)?;

        let mut client = self.api_client.write().await;
        match client.as_mut() {
            Some(c) => c.set_access_token(&access_token),
            None => *client = Some(self.new_client(&access_token)?),
        }
        Ok(())
    }

    async fn resolve(&self, name: &str) -> ProviderResult<String> {
        self.ensure_client().await?;
        let guard = self.api_client.read().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| ProviderError::internal("API client missing after authentication"))?;

        let calendars = client.list_calendars().await?;
        match calendars.into_iter().find(|c| c.summary == name) {
            Some(calendar) => {
                debug!(name, id = %calendar.id, "resolved calendar");
                Ok(calendar.id)
            }
            None => {
                error!(name, "no calendar with this name, using primary");
                Ok(PRIMARY_CALENDAR.to_string())
            }
        }
    }

    async fn list(&self, calendar_id: &str, window: TimeWindow) -> ProviderResult<Vec<CalendarEvent>> {
        self.ensure_client().await?;
        let guard = self.api_client.read().await;
        match guard.as_ref() {
            Some(client) => client.list_events(calendar_id, window).await,
            None => Err(ProviderError::internal("API client missing after authentication")),
        }
    }

    async fn insert(&self, calendar_id: &str, payload: &EventPayload) -> ProviderResult<()> {
        self.ensure_client().await?;
        let guard = self.api_client.read().await;
        match guard.as_ref() {
            Some(client) => client.insert_event(calendar_id, payload).await,
            None => Err(ProviderError::internal("API client missing after authentication")),
        }
    }

    async fn patch(&self, calendar_id: &str, event_id: &str, payload: &EventPayload) -> ProviderResult<()> {
        self.ensure_client().await?;
        let guard = self.api_client.read().await;
        match guard.as_ref() {
            Some(client) => client.patch_event(calendar_id, event_id, payload).await,
            None => Err(ProviderError::internal("API client missing after authentication")),
        }
    }
}

impl CalendarService for GoogleCalendar {
    fn name(&self) -> &str {
        "google"
    }

    fn resolve_calendar<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move { self.resolve(name).await.map_err(|e| e.with_provider("google")) })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
        Box::pin(async move {
            self.list(calendar_id, window)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }

    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        payload: &'a EventPayload,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.insert(calendar_id, payload)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        payload: &'a EventPayload,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.patch(calendar_id, event_id, payload)
                .await
                .map_err(|e| e.with_provider("google"))
        })
    }
}
