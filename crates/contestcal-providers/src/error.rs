//! Errors shared by contest sources and calendar services.
//!
//! Every failure carries a [`ProviderErrorCode`] so callers can tell an
//! expired token from an unreachable host without string matching.

use std::fmt;

use thiserror::Error;

/// What went wrong, coarsely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Missing, expired or rejected credentials (401).
    AuthenticationFailed,
    /// Credentials accepted but not allowed (403).
    AuthorizationFailed,
    /// The request never got an HTTP answer.
    NetworkError,
    /// 429.
    RateLimited,
    /// 5xx.
    ServerError,
    /// The body did not have the expected shape.
    InvalidResponse,
    /// 404.
    NotFound,
    /// Any other 4xx, e.g. 409 for an event id that already exists.
    BadRequest,
    ConfigurationError,
    InternalError,
}

impl ProviderErrorCode {
    /// Snake-case name used in messages and logs.
    pub fn as_str(&self) -> &'static str {
        use ProviderErrorCode::*;
        match self {
            AuthenticationFailed => "authentication_failed",
            AuthorizationFailed => "authorization_failed",
            NetworkError => "network_error",
            RateLimited => "rate_limited",
            ServerError => "server_error",
            InvalidResponse => "invalid_response",
            NotFound => "not_found",
            BadRequest => "bad_request",
            ConfigurationError => "configuration_error",
            InternalError => "internal_error",
        }
    }

    /// Maps a non-success HTTP status to a code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::AuthenticationFailed,
            403 => Self::AuthorizationFailed,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400..=499 => Self::BadRequest,
            _ => Self::ServerError,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call to clist.by or the calendar API.
///
/// Displays as `[provider] code: message`, the prefix only once
/// [`with_provider`](Self::with_provider) has tagged it.
#[derive(Debug, Error)]
#[error("{}{code}: {message}", provider_prefix(.provider))]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

fn provider_prefix(provider: &Option<String>) -> String {
    provider.as_ref().map(|p| format!("[{}] ", p)).unwrap_or_default()
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Builds an error from a non-success status and its (trimmed) body.
    pub fn http(status: u16, body: impl AsRef<str>) -> Self {
        let message = match body.as_ref().trim() {
            "" => format!("HTTP {}", status),
            body => format!("HTTP {}: {}", status, body),
        };
        Self::new(ProviderErrorCode::from_status(status), message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Tags the error with the implementation that raised it.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}

#[cfg(any(feature = "google", feature = "clist"))]
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let message = match () {
            _ if err.is_timeout() => "request timed out".to_string(),
            _ if err.is_connect() => format!("could not connect: {}", err),
            _ => format!("request failed: {}", err),
        };
        Self::network(message).with_source(err)
    }
}

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;
