//! Contest sources and calendar services.
//!
//! - [`ContestSource`] - produces upcoming contests ([`clist::ClistSource`])
//! - [`CalendarService`] - reads and writes calendar events
//!   ([`google::GoogleCalendar`], [`MemoryCalendar`])
//! - [`ProviderError`] - error type shared by every implementation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐             ┌─────────────────────┐
//! │  clist.by API   │             │ Google Calendar API │
//! └────────┬────────┘             └──────────┬──────────┘
//!          │                                 │
//!          ▼                                 ▼
//! ┌─────────────────┐             ┌─────────────────────┐
//! │   ClistSource   │             │   GoogleCalendar    │
//! └────────┬────────┘             └──────────┬──────────┘
//!          │ ContestSource                   │ CalendarService
//!          └──────────────┬──────────────────┘
//!                         ▼
//!                   contestcal-sync
//! ```

#[cfg(feature = "clist")]
pub mod clist;
pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod memory;
pub mod service;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use memory::{MemoryCalendar, MemoryContests, WriteCall};
pub use service::{BoxFuture, CalendarService, ContestSource, PRIMARY_CALENDAR};
