//! Shape of a `/api/v2/contest/` response.
//!
//! Deserializing into these types is the validation step: a body missing
//! `meta` or `objects` is rejected as an invalid response.

use contestcal_core::ContestRecord;
use serde::Deserialize;

/// Pagination block.
#[derive(Debug, Clone, Deserialize)]
pub struct ListMeta {
    /// Page size.
    pub limit: Option<u64>,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// Offset of this page.
    pub offset: Option<u64>,
    /// URL of the previous page, if any.
    pub previous: Option<String>,
    /// Total number of matching contests.
    pub total_count: Option<u64>,
}

/// `objects` is a plain array on the live API; older payloads wrap it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContestObjects {
    List(Vec<ContestRecord>),
    Wrapped { contest: Vec<ContestRecord> },
}

impl ContestObjects {
    pub(crate) fn into_vec(self) -> Vec<ContestRecord> {
        match self {
            Self::List(contests) | Self::Wrapped { contest: contests } => contests,
        }
    }
}

/// A full response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ContestListResponse {
    pub(crate) meta: ListMeta,
    pub(crate) objects: ContestObjects,
}
