//! Favorite contest hosts.
//!
//! The list is ordered: it filters which contests get synced and ranks them
//! for color assignment. Matching is containment, so `codeforces.com` also
//! matches `codeforces.com/gym` or `m1.codeforces.com`.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Color used when a host matches no favorite entry.
pub const DEFAULT_COLOR_ID: u8 = 1;

/// Ordered allow-list of contest-hosting domains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteHosts(Vec<String>);

impl FavoriteHosts {
    /// Creates a list from domain strings, keeping their order.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(hosts.into_iter().map(Into::into).collect())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Index of the first entry contained in `host`.
    ///
    /// An empty entry is contained in every host, so it matches everything
    /// ranked after it. Configuration loading rejects empty entries.
    pub fn position(&self, host: &str) -> Option<usize> {
        self.0.iter().position(|favorite| host.contains(favorite.as_str()))
    }

    /// Returns `true` if some entry is contained in `host`.
    pub fn matches(&self, host: &str) -> bool {
        self.position(host).is_some()
    }
}

/// Maps a contest host to a calendar color id.
///
/// Returns the 1-based rank of the first favorite contained in `host`, or
/// [`DEFAULT_COLOR_ID`] when the host is absent, empty, or unmatched.
pub fn compute_color(host: Option<&str>, favorites: &FavoriteHosts) -> u8 {
    let Some(host) = host.filter(|h| !h.is_empty()) else {
        debug!("contest has no host, using default color");
        return DEFAULT_COLOR_ID;
    };

    match favorites.position(host) {
        Some(index) => u8::try_from(index + 1).unwrap_or(DEFAULT_COLOR_ID),
        None => {
            debug!(host, "no favorite host matches, using default color");
            DEFAULT_COLOR_ID
        }
    }
}
