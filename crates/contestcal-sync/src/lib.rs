//! Contest to calendar reconciliation.
//!
//! For each fetched contest the engine decides whether to create a calendar
//! event, patch an existing one, or leave it alone, based on a field-level
//! comparison against the events already in the calendar.
//!
//! ```text
//! ContestSource ──► contests ─┐
//!                             ├─► plan() ──► Vec<SyncAction> ──► apply() ──► SyncReport
//! CalendarService ─► events ──┘                                     │
//!        ▲                                                          │
//!        └──────────────────── create / patch ◄─────────────────────┘
//! ```

pub mod compare;
pub mod error;
pub mod payload;
pub mod reconcile;
pub mod runner;

pub use compare::is_same_contest;
pub use error::{SyncError, SyncResult};
pub use payload::{REMINDER_MINUTES, build_payload};
pub use reconcile::{SyncAction, SyncReport, apply, plan, reconcile};
pub use runner::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS, SyncConfig, SyncOutcome, SyncPreview, SyncRunner};
