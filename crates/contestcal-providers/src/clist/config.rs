//! clist.by account settings.

use std::time::Duration;

/// Credentials and endpoint for the clist.by API.
#[derive(Clone)]
pub struct ClistConfig {
    /// Account name.
    pub username: String,
    /// API key from the clist.by profile page.
    pub api_key: String,
    /// Site root, without trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClistConfig {
    /// Public clist.by site.
    pub const DEFAULT_BASE_URL: &'static str = "https://clist.by";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the public site.
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the site root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Contest list endpoint.
    pub fn contest_url(&self) -> String {
        format!("{}/api/v2/contest/", self.base_url)
    }
}

// The API key must never reach logs.
impl std::fmt::Debug for ClistConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClistConfig")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contest_url_without_double_slash() {
        let config = ClistConfig::new("user", "key").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.contest_url(), "http://127.0.0.1:9000/api/v2/contest/");
        assert_eq!(
            ClistConfig::new("user", "key").contest_url(),
            "https://clist.by/api/v2/contest/"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let debug = format!("{:?}", ClistConfig::new("user", "2ca918secret"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("2ca918secret"));
    }
}
